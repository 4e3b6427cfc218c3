//! Controller errors.

use hearth_types::{AlarmState, CodeOutcome, InvalidCodeFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("mode switch denied: code not confirmed")]
    ModeSwitchDenied,

    #[error("wrong alarm code")]
    CodeRejected,

    #[error("no code entered in time")]
    CodeEntryTimeout,

    #[error(transparent)]
    InvalidCodeFormat(#[from] InvalidCodeFormat),

    #[error("only available in manual mode")]
    NotInManualMode,

    #[error("alarm is {0}, expected Disarmed")]
    AlarmBusy(AlarmState),

    #[error("presence detected, cannot arm")]
    PresenceDetected,

    #[error("controller not running")]
    NotRunning,

    #[error("backend error: {0}")]
    Io(#[from] hearth_io::IoError),
}

impl ControllerError {
    /// Error for a code session that did not end in acceptance.
    pub(crate) fn from_outcome(outcome: CodeOutcome) -> Option<Self> {
        match outcome {
            CodeOutcome::Accepted => None,
            CodeOutcome::Rejected => Some(Self::CodeRejected),
            CodeOutcome::TimedOut => Some(Self::CodeEntryTimeout),
        }
    }
}
