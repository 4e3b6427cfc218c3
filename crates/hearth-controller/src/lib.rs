//! Reactive core for hearth.
//!
//! Sensor watchers poll their sensors and report predicate edges to a
//! single controller task, which owns the alarm state machine, the
//! automatic/manual mode and the actuators. Front-ends talk to it through
//! a [`ControllerHandle`] and read state from [`StatusSnapshot`]s.
//!
//! [`StatusSnapshot`]: hearth_types::StatusSnapshot

pub mod actuator;
pub mod alarm;
pub mod board;
pub mod code_entry;
pub mod config;
pub mod controller;
pub mod error;
pub mod handle;
pub mod mode;
pub mod setup;
pub mod store;
pub mod supervisor;
pub mod watcher;

pub use board::StatusBoard;
pub use config::Config;
pub use controller::{Backends, Command, Controller, ControllerEvent, ManualAction};
pub use error::ControllerError;
pub use handle::ControllerHandle;
pub use store::FileCodeStore;
