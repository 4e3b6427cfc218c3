//! Backend-agnostic collaborator interfaces for hearth.
//!
//! This crate defines the [`SensorSource`], [`ActuatorDriver`], [`Notifier`]
//! and [`CodePersistence`] traits. The controller core only talks to these,
//! so a local GPIO board, a simulator or a remote key-value store can sit
//! behind it without the core changing.

use async_trait::async_trait;
use hearth_types::{AlarmCode, ClimateReading, LightColor, Notice, RawValue, SensorKind};

pub mod error;
#[cfg(feature = "sim")]
pub mod sim;

pub use error::IoError;

/// Reads raw sensor values.
///
/// Shared by every watcher, so reads take `&self`.
#[async_trait]
pub trait SensorSource: Send + Sync + 'static {
    /// Read one value from the given sensor.
    async fn read(&self, kind: SensorKind) -> Result<RawValue, IoError>;

    /// Read temperature and humidity, if the backend has a climate sensor.
    async fn read_climate(&self) -> Result<ClimateReading, IoError> {
        Err(IoError::ClimateUnavailable)
    }
}

/// Drives the effectors.
///
/// Owned by the controller task, which may move between worker threads, so
/// drivers must be `Send + Sync`.
#[async_trait]
pub trait ActuatorDriver: Send + Sync + 'static {
    /// Set the light colour; `None` switches it off.
    async fn set_light(&mut self, color: Option<LightColor>) -> Result<(), IoError>;

    /// Open (`true`) or close the window.
    async fn set_window(&mut self, open: bool) -> Result<(), IoError>;

    /// Sound (`true`) or silence the siren.
    async fn set_siren(&mut self, on: bool) -> Result<(), IoError>;
}

/// Receives human-readable events. Best-effort: the core never observes a
/// result.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn notify(&self, notice: &Notice);
}

/// Stores the alarm code.
#[async_trait]
pub trait CodePersistence: Send + Sync + 'static {
    async fn get_code(&self) -> Result<AlarmCode, IoError>;

    async fn set_code(&self, code: &AlarmCode) -> Result<(), IoError>;
}
