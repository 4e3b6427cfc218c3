//! Controller configuration loaded from TOML.

use std::path::PathBuf;
use std::time::Duration;

use hearth_types::{AlarmCode, Comparison, LightColor, RawValue, SensorKind, SystemMode};
use serde::{Deserialize, Serialize};

use crate::error::ControllerError;
use crate::watcher::WatcherConfig;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub alarm: AlarmConfig,
    #[serde(default)]
    pub sensors: SensorsConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
}

impl Config {
    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ControllerError> {
        AlarmCode::parse(&self.alarm.default_code).map_err(|_| {
            ControllerError::Config("alarm.default_code must be 4 digits".to_string())
        })?;
        for kind in SensorKind::ALL {
            let sensor = self.sensors.get(kind);
            if sensor.poll_interval(kind).is_zero() {
                return Err(ControllerError::Config(format!(
                    "sensors.{kind}.poll_interval_ms must be greater than zero"
                )));
            }
            // A `Below` rule at or under zero can never hold.
            let threshold = sensor.threshold(kind);
            let usable = match sensor.watcher_config(kind).comparison {
                Comparison::Below(_) => threshold > 0,
                Comparison::Above(_) => threshold >= 0,
                Comparison::NonZero => true,
            };
            if !usable {
                return Err(ControllerError::Config(format!(
                    "sensors.{kind}.threshold {threshold} can never trigger"
                )));
            }
        }
        if self.alarm.code_entry_timeout_secs == 0 || self.alarm.mode_switch_timeout_secs == 0 {
            return Err(ControllerError::Config(
                "code entry timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// One watcher configuration per sensor kind.
    pub fn watcher_configs(&self) -> Vec<WatcherConfig> {
        SensorKind::ALL
            .into_iter()
            .map(|kind| self.sensors.get(kind).watcher_config(kind))
            .collect()
    }
}

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default = "default_startup_mode")]
    pub startup_mode: SystemMode,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            startup_mode: default_startup_mode(),
            log_level: default_log_level(),
        }
    }
}

/// Alarm timings and code storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmConfig {
    #[serde(default = "default_activation_delay")]
    pub activation_delay_secs: u64,
    #[serde(default = "default_code_entry_timeout")]
    pub code_entry_timeout_secs: u64,
    #[serde(default = "default_mode_switch_timeout")]
    pub mode_switch_timeout_secs: u64,
    /// Seeds the code store when it is empty.
    #[serde(default = "default_code")]
    pub default_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_file: Option<PathBuf>,
}

impl AlarmConfig {
    pub fn activation_delay(&self) -> Duration {
        Duration::from_secs(self.activation_delay_secs)
    }

    pub fn code_entry_timeout(&self) -> Duration {
        Duration::from_secs(self.code_entry_timeout_secs)
    }

    pub fn mode_switch_timeout(&self) -> Duration {
        Duration::from_secs(self.mode_switch_timeout_secs)
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            activation_delay_secs: default_activation_delay(),
            code_entry_timeout_secs: default_code_entry_timeout(),
            mode_switch_timeout_secs: default_mode_switch_timeout(),
            default_code: default_code(),
            code_file: None,
        }
    }
}

/// Per-sensor polling settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorsConfig {
    #[serde(default)]
    pub light: SensorConfig,
    #[serde(default)]
    pub motion: SensorConfig,
    #[serde(default)]
    pub range: SensorConfig,
    #[serde(default)]
    pub gas: SensorConfig,
}

impl SensorsConfig {
    pub fn get(&self, kind: SensorKind) -> &SensorConfig {
        match kind {
            SensorKind::Light => &self.light,
            SensorKind::Motion => &self.motion,
            SensorKind::Range => &self.range,
            SensorKind::Gas => &self.gas,
        }
    }
}

/// Polling settings for one sensor. Unset fields fall back to the
/// per-kind defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    /// Light: dark below. Range: presence below (cm). Gas: danger above.
    /// Ignored for motion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<RawValue>,
}

impl SensorConfig {
    pub fn poll_interval(&self, kind: SensorKind) -> Duration {
        Duration::from_millis(
            self.poll_interval_ms
                .unwrap_or_else(|| default_poll_interval_ms(kind)),
        )
    }

    pub fn threshold(&self, kind: SensorKind) -> RawValue {
        self.threshold.unwrap_or_else(|| default_threshold(kind))
    }

    fn watcher_config(&self, kind: SensorKind) -> WatcherConfig {
        let threshold = self.threshold(kind);
        let comparison = match kind {
            SensorKind::Light | SensorKind::Range => Comparison::Below(threshold),
            SensorKind::Gas => Comparison::Above(threshold),
            SensorKind::Motion => Comparison::NonZero,
        };
        WatcherConfig {
            kind,
            poll_interval: self.poll_interval(kind),
            comparison,
        }
    }
}

/// Light automation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LightingConfig {
    /// Colour used when it gets dark.
    #[serde(default)]
    pub color: LightColor,
}

fn default_startup_mode() -> SystemMode {
    SystemMode::Automatic
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_activation_delay() -> u64 {
    10
}

fn default_code_entry_timeout() -> u64 {
    10
}

fn default_mode_switch_timeout() -> u64 {
    30
}

fn default_code() -> String {
    "1234".to_string()
}

fn default_poll_interval_ms(kind: SensorKind) -> u64 {
    match kind {
        SensorKind::Light | SensorKind::Motion => 100,
        SensorKind::Range | SensorKind::Gas => 200,
    }
}

fn default_threshold(kind: SensorKind) -> RawValue {
    match kind {
        SensorKind::Light => 500,
        SensorKind::Motion => 0,
        SensorKind::Range => 100,
        SensorKind::Gas => 300,
    }
}
