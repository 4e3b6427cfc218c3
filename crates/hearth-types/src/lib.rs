//! Shared types for hearth.
//!
//! This crate contains the types shared across the hearth workspace:
//! sensor kinds and edge events, alarm and mode states, alarm codes,
//! actuator commands, status snapshots and notifier events.

pub mod actuator;
pub mod alarm;
pub mod climate;
pub mod mode;
pub mod notice;
pub mod sensor;
pub mod status;

pub use actuator::{ActuatorCommand, LightColor, UnknownColor};
pub use alarm::{
    AlarmCode, AlarmState, CodeOutcome, CodePurpose, InvalidCodeFormat, CODE_LEN,
};
pub use climate::{ClimateReading, ClothingAdvice};
pub use mode::SystemMode;
pub use notice::Notice;
pub use sensor::{Comparison, EdgeEvent, RawValue, SensorKind, UnknownSensorKind};
pub use status::{SensorObservation, StatusSnapshot};
