//! Actuator commands.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Colour of the RGB light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    #[default]
    White,
    Red,
    Green,
    Blue,
    Yellow,
}

impl std::fmt::Display for LightColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::White => write!(f, "white"),
            Self::Red => write!(f, "red"),
            Self::Green => write!(f, "green"),
            Self::Blue => write!(f, "blue"),
            Self::Yellow => write!(f, "yellow"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown light colour: {0}")]
pub struct UnknownColor(pub String);

impl std::str::FromStr for LightColor {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "white" => Ok(Self::White),
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            "yellow" => Ok(Self::Yellow),
            _ => Err(UnknownColor(s.to_string())),
        }
    }
}

/// A single command issued to the actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuatorCommand {
    /// `None` switches the light off.
    Light(Option<LightColor>),
    /// `true` opens the window.
    Window(bool),
    /// `true` sounds the siren.
    Siren(bool),
}

impl std::fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light(Some(color)) => write!(f, "light {color}"),
            Self::Light(None) => write!(f, "light off"),
            Self::Window(true) => write!(f, "window open"),
            Self::Window(false) => write!(f, "window closed"),
            Self::Siren(true) => write!(f, "siren on"),
            Self::Siren(false) => write!(f, "siren off"),
        }
    }
}
