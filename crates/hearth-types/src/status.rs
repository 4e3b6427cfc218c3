//! Point-in-time status of the whole controller.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actuator::LightColor;
use crate::alarm::{AlarmState, CodePurpose};
use crate::mode::SystemMode;
use crate::sensor::{RawValue, SensorKind};

/// Last reading taken from one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorObservation {
    pub raw: RawValue,
    /// Derived predicate for this reading.
    pub active: bool,
    pub at: DateTime<Utc>,
}

/// A consistent snapshot of every field a front-end renders.
///
/// Snapshots are captured in one step; fields never mix values from
/// different moments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub mode: SystemMode,
    pub alarm: AlarmState,
    pub readings: BTreeMap<SensorKind, SensorObservation>,
    /// Last commanded light colour; `None` = off.
    pub light: Option<LightColor>,
    pub window_open: bool,
    pub siren_on: bool,
    /// Number of live sensor watchers.
    pub active_watchers: usize,
    /// Set while a code-entry session is collecting keypad input.
    pub code_prompt: Option<CodePurpose>,
}

impl StatusSnapshot {
    /// Last observation of `kind`, if any.
    pub fn reading(&self, kind: SensorKind) -> Option<&SensorObservation> {
        self.readings.get(&kind)
    }

    /// Whether the range sensor currently reports someone inside.
    pub fn presence_detected(&self) -> bool {
        self.reading(SensorKind::Range).is_some_and(|r| r.active)
    }
}
