//! Sensor kinds, threshold rules and edge events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw numeric reading.
///
/// Light is an ADC count, range a distance in centimetres, gas an ADC count
/// from the MQ-2 and motion a PIR level (zero = no motion).
pub type RawValue = i32;

/// The discrete sensors the controller watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Photoresistor.
    Light,
    /// Porch PIR sensor.
    Motion,
    /// Indoor ultrasonic range finder.
    Range,
    /// MQ-2 gas sensor.
    Gas,
}

impl SensorKind {
    /// Every kind, in the order watchers are spawned.
    pub const ALL: [SensorKind; 4] = [Self::Light, Self::Motion, Self::Range, Self::Gas];

    /// Name of the boolean predicate derived from this sensor.
    #[must_use]
    pub fn predicate_name(self) -> &'static str {
        match self {
            Self::Light => "dark",
            Self::Motion => "motion",
            Self::Range => "presence",
            Self::Gas => "danger",
        }
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Light => "light",
            Self::Motion => "motion",
            Self::Range => "range",
            Self::Gas => "gas",
        })
    }
}

#[derive(Debug, Error)]
#[error("unknown sensor kind: {0}")]
pub struct UnknownSensorKind(pub String);

impl std::str::FromStr for SensorKind {
    type Err = UnknownSensorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" | "ldr" => Ok(Self::Light),
            "motion" | "pir" => Ok(Self::Motion),
            "range" | "distance" => Ok(Self::Range),
            "gas" | "mq2" => Ok(Self::Gas),
            _ => Err(UnknownSensorKind(s.to_string())),
        }
    }
}

/// How a raw value maps onto the sensor's boolean predicate.
///
/// There is no hysteresis band: a value sitting on the threshold toggles the
/// predicate on every change across it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// Predicate holds while `raw < threshold`.
    Below(RawValue),
    /// Predicate holds while `raw > threshold`.
    Above(RawValue),
    /// Predicate holds while `raw != 0`.
    NonZero,
}

impl Comparison {
    /// Evaluate the predicate for one reading.
    #[must_use]
    pub fn evaluate(self, raw: RawValue) -> bool {
        match self {
            Self::Below(threshold) => raw < threshold,
            Self::Above(threshold) => raw > threshold,
            Self::NonZero => raw != 0,
        }
    }
}

/// A change of a sensor's derived predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEvent {
    pub kind: SensorKind,
    /// New predicate value (dark, motion, presence or danger).
    pub active: bool,
    /// Predicate value before this reading; `None` on the first observation.
    pub previous: Option<bool>,
    /// The reading that produced the change.
    pub raw: RawValue,
    pub at: DateTime<Utc>,
}

impl EdgeEvent {
    /// Whether this is the unknown-to-known observation rather than a
    /// transition between two known states.
    #[must_use]
    pub fn is_first_observation(&self) -> bool {
        self.previous.is_none()
    }

    /// A rising edge: the predicate became true.
    #[must_use]
    pub fn is_rising(&self) -> bool {
        self.active
    }
}
