//! Alarm states, alarm codes and code-entry outcomes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of digits in an alarm code.
pub const CODE_LEN: usize = 4;

/// State of the intrusion alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlarmState {
    /// Not monitoring.
    #[default]
    Disarmed,
    /// Code accepted, waiting for the activation delay to elapse.
    ArmingCountdown,
    /// Monitoring for presence.
    Armed,
    /// Presence detected while armed; siren on, waiting for the code.
    AwaitingCode,
    /// Code not entered in time (or wrong). Stays here until an operator
    /// disarms.
    Triggered,
}

impl AlarmState {
    /// Whether the alarm is armed or about to be.
    pub fn is_engaged(self) -> bool {
        !matches!(self, Self::Disarmed)
    }
}

impl std::fmt::Display for AlarmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disarmed => write!(f, "Disarmed"),
            Self::ArmingCountdown => write!(f, "ArmingCountdown"),
            Self::Armed => write!(f, "Armed"),
            Self::AwaitingCode => write!(f, "AwaitingCode"),
            Self::Triggered => write!(f, "Triggered"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("alarm code must be exactly {CODE_LEN} decimal digits")]
pub struct InvalidCodeFormat;

/// A validated 4-digit alarm code.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlarmCode(String);

impl AlarmCode {
    /// Validate and wrap a candidate code.
    pub fn parse(candidate: &str) -> Result<Self, InvalidCodeFormat> {
        if is_well_formed(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(InvalidCodeFormat)
        }
    }

    /// Exact comparison against raw keypad input.
    pub fn matches(&self, input: &str) -> bool {
        self.0 == input
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether `input` is exactly [`CODE_LEN`] ASCII digits.
pub fn is_well_formed(input: &str) -> bool {
    input.len() == CODE_LEN && input.bytes().all(|b| b.is_ascii_digit())
}

impl TryFrom<String> for AlarmCode {
    type Error = InvalidCodeFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AlarmCode> for String {
    fn from(code: AlarmCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for AlarmCode {
    type Err = InvalidCodeFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Codes never show up in logs.
impl std::fmt::Debug for AlarmCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AlarmCode(****)")
    }
}

/// Why a code is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodePurpose {
    /// Confirm arming from the disarmed state.
    Arm,
    /// Presence detected while armed.
    Intrusion,
    /// Operator disarm.
    Disarm,
    /// Confirm leaving automatic mode.
    ManualMode,
}

impl std::fmt::Display for CodePurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Arm => write!(f, "arm"),
            Self::Intrusion => write!(f, "intrusion"),
            Self::Disarm => write!(f, "disarm"),
            Self::ManualMode => write!(f, "manual mode"),
        }
    }
}

/// Resolution of a code-entry session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeOutcome {
    Accepted,
    Rejected,
    TimedOut,
}

impl CodeOutcome {
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}
