//! Climate readings and clothing advice.

use serde::{Deserialize, Serialize};

/// Relative humidity above which air counts as humid.
pub const HUMID_ABOVE_PCT: f32 = 70.0;

/// Temperature and humidity from the DHT22.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// One of six outfit recommendations, keyed on temperature band and humidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClothingAdvice {
    ColdHumid,
    Cold,
    CoolHumid,
    Cool,
    WarmHumid,
    Warm,
}

impl ClothingAdvice {
    /// Pick the recommendation for a reading.
    ///
    /// Bands: cold below 10 °C, cool from 10 to 20 °C, warm from 20 °C.
    pub fn for_reading(reading: ClimateReading) -> Self {
        let humid = reading.humidity_pct > HUMID_ABOVE_PCT;
        let t = reading.temperature_c;
        match (t < 10.0, t < 20.0, humid) {
            (true, _, true) => Self::ColdHumid,
            (true, _, false) => Self::Cold,
            (false, true, true) => Self::CoolHumid,
            (false, true, false) => Self::Cool,
            (false, false, true) => Self::WarmHumid,
            (false, false, false) => Self::Warm,
        }
    }
}

impl std::fmt::Display for ClothingAdvice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::ColdHumid => {
                "Very cold and damp. Wear a warm jacket, waterproof shoes and a hat; \
                 the humidity makes it feel colder."
            }
            Self::Cold => "Cold but dry. Take a warm jacket and gloves.",
            Self::CoolHumid => {
                "Cool and damp. A light jacket will do; the humidity makes the air feel cooler."
            }
            Self::Cool => "Cool with normal humidity. A sweater or windbreaker is enough.",
            Self::WarmHumid => "Warm but humid. Wear light, breathable clothes.",
            Self::Warm => "Warm and comfortable. Everyday light clothing is fine.",
        };
        f.write_str(text)
    }
}
