//! Controller operating mode.

use serde::{Deserialize, Serialize};

/// Whether the sensor-driven automation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemMode {
    /// Sensor watchers run and drive the alarm and actuators.
    Automatic,
    /// No watchers; the operator drives actuators directly.
    #[default]
    Manual,
}

impl std::fmt::Display for SystemMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Automatic => write!(f, "automatic"),
            Self::Manual => write!(f, "manual"),
        }
    }
}
