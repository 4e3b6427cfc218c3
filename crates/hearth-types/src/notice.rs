//! Human-readable events pushed to the notifier.
//!
//! The controller emits structured [`Notice`]s; the `Display` impl gives the
//! default English wording. Front-ends that localise match on the variant.

use serde::{Deserialize, Serialize};

use crate::actuator::ActuatorCommand;
use crate::alarm::CodePurpose;
use crate::climate::{ClimateReading, ClothingAdvice};
use crate::sensor::RawValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    /// Gas level rose above the threshold.
    GasDanger { raw: RawValue },
    /// Gas level is back to normal.
    GasNormal { raw: RawValue },
    /// The porch PIR saw movement.
    MotionDetected,
    /// The window actuator was commanded.
    WindowMoved { open: bool },
    /// A code-entry session opened.
    CodeRequested { purpose: CodePurpose, timeout_secs: u64 },
    /// Code accepted; the alarm arms after the delay.
    ArmingScheduled { delay_secs: u64 },
    /// The activation delay elapsed.
    AlarmArmed,
    /// Arming was requested but the code was wrong or late.
    ArmFailed,
    /// Correct code entered after presence was detected.
    WelcomeHome,
    /// No correct code after presence was detected; the siren stays on.
    UnauthorizedAccess,
    /// Operator disarmed the alarm.
    AlarmDisarmed,
    /// Operator disarm was refused.
    DisarmFailed,
    /// The operator forced the alarm state from manual mode.
    AlarmForced { armed: bool },
    /// Automatic mode is active and watchers are running.
    AutomaticMode,
    /// Leaving automatic mode needs a code.
    ManualModeRequested,
    /// Watchers are stopped; the operator has direct control.
    ManualMode,
    /// Manual mode was refused; automation keeps running.
    ModeSwitchDenied,
    /// A new alarm code was stored.
    CodeChanged,
    /// An actuator did not accept a command.
    ActuatorFault { command: ActuatorCommand },
    /// Clothing recommendation for the current climate.
    Clothing {
        reading: ClimateReading,
        advice: ClothingAdvice,
    },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GasDanger { raw } => {
                write!(f, "Warning! Gas level in the air is too high ({raw}). Opening the window.")
            }
            Self::GasNormal { raw } => write!(f, "Gas level in the air is back to normal ({raw})."),
            Self::MotionDetected => write!(f, "Warning! Motion detected near the house."),
            Self::WindowMoved { open: true } => write!(f, "Window opened."),
            Self::WindowMoved { open: false } => write!(f, "Window closed."),
            Self::CodeRequested {
                purpose,
                timeout_secs,
            } => write!(
                f,
                "Enter the alarm code for {purpose} within {timeout_secs} s, then press #."
            ),
            Self::ArmingScheduled { delay_secs } => {
                write!(f, "Code accepted. The alarm activates in {delay_secs} seconds.")
            }
            Self::AlarmArmed => write!(f, "The alarm is armed."),
            Self::ArmFailed => write!(f, "Wrong code. The alarm was not armed."),
            Self::WelcomeHome => write!(
                f,
                "Welcome home. If this was not you, call the police immediately!"
            ),
            Self::UnauthorizedAccess => write!(
                f,
                "Unauthorized access detected! The siren is on until the alarm is disarmed."
            ),
            Self::AlarmDisarmed => write!(f, "The alarm is disarmed."),
            Self::DisarmFailed => write!(f, "Wrong code. The alarm is still active."),
            Self::AlarmForced { armed: true } => write!(f, "Alarm switched on."),
            Self::AlarmForced { armed: false } => write!(f, "Alarm switched off."),
            Self::AutomaticMode => write!(f, "Running in automatic mode."),
            Self::ManualModeRequested => write!(
                f,
                "Switching to manual mode stops all automatic systems. Enter the code to confirm."
            ),
            Self::ManualMode => write!(
                f,
                "Manual mode active. Each actuator can now be controlled individually."
            ),
            Self::ModeSwitchDenied => write!(f, "Wrong code. Staying in automatic mode."),
            Self::CodeChanged => write!(f, "New alarm code saved."),
            Self::ActuatorFault { command } => write!(f, "Actuator did not respond: {command}."),
            Self::Clothing { reading, advice } => write!(
                f,
                "Temperature: {:.1} °C, humidity: {:.0} %. {advice}",
                reading.temperature_c, reading.humidity_pct
            ),
        }
    }
}
