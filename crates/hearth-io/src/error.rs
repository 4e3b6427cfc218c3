//! Backend errors.

use hearth_types::{InvalidCodeFormat, SensorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("{kind} sensor unavailable: {reason}")]
    SensorUnavailable { kind: SensorKind, reason: String },

    #[error("climate sensor unavailable")]
    ClimateUnavailable,

    #[error("actuator failure: {0}")]
    ActuatorFailure(String),

    #[error("code storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    InvalidCodeFormat(#[from] InvalidCodeFormat),
}
