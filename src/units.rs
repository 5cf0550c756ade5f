//! Metric/imperial conversions.
//!
//! Upstream data is always fetched in metric; these functions translate it for
//! callers who asked for imperial output. No rounding happens here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

const MPH_PER_KMH: f64 = 0.621371;
const INCHES_PER_MM: f64 = 0.0393701;
const INHG_PER_HPA: f64 = 0.02953;

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh * MPH_PER_KMH
}

pub fn mph_to_kmh(mph: f64) -> f64 {
    mph / MPH_PER_KMH
}

pub fn mm_to_inches(mm: f64) -> f64 {
    mm * INCHES_PER_MM
}

pub fn inches_to_mm(inches: f64) -> f64 {
    inches / INCHES_PER_MM
}

pub fn hpa_to_inhg(hpa: f64) -> f64 {
    hpa * INHG_PER_HPA
}

pub fn inhg_to_hpa(inhg: f64) -> f64 {
    inhg / INHG_PER_HPA
}

/// Converts a wind direction in degrees to a 16-point compass label
pub fn degrees_to_compass(degrees: f64) -> &'static str {
    const DIRECTIONS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    let normalized = degrees.rem_euclid(360.0);
    let index = (normalized / 22.5).round() as usize % DIRECTIONS.len();
    DIRECTIONS[index]
}

/// Unit system used for tool output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// Labels for the units a response is expressed in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitLabels {
    pub temperature: &'static str,
    pub wind_speed: &'static str,
    pub pressure: &'static str,
    pub precipitation: &'static str,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub fn labels(&self) -> UnitLabels {
        match self {
            UnitSystem::Metric => UnitLabels {
                temperature: "°C",
                wind_speed: "km/h",
                pressure: "hPa",
                precipitation: "mm",
            },
            UnitSystem::Imperial => UnitLabels {
                temperature: "°F",
                wind_speed: "mph",
                pressure: "inHg",
                precipitation: "in",
            },
        }
    }

    /// Expresses a Celsius value in this system
    pub fn temperature(&self, celsius: f64) -> f64 {
        match self {
            UnitSystem::Metric => celsius,
            UnitSystem::Imperial => celsius_to_fahrenheit(celsius),
        }
    }

    /// Expresses a km/h value in this system
    pub fn speed(&self, kmh: f64) -> f64 {
        match self {
            UnitSystem::Metric => kmh,
            UnitSystem::Imperial => kmh_to_mph(kmh),
        }
    }

    /// Expresses an hPa value in this system
    pub fn pressure(&self, hpa: f64) -> f64 {
        match self {
            UnitSystem::Metric => hpa,
            UnitSystem::Imperial => hpa_to_inhg(hpa),
        }
    }

    /// Expresses a millimetre value in this system
    pub fn precipitation(&self, mm: f64) -> f64 {
        match self {
            UnitSystem::Metric => mm,
            UnitSystem::Imperial => mm_to_inches(mm),
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = WeatherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(WeatherError::validation(format!(
                "units must be 'metric' or 'imperial', got '{value}'"
            ))),
        }
    }
}
