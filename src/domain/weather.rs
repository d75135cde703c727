//! Temperature conversion and the weather response body.

use serde::{Deserialize, Serialize, Serializer};

/// Offset added to Celsius to obtain Kelvin.
///
/// The service reports `temp_C + 273`, not `+ 273.15`; clients depend on it.
pub const KELVIN_OFFSET: f64 = 273.0;

/// Largest magnitude rendered as an integer literal.
const MAX_EXACT_INTEGER: f64 = 1e15;

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

/// Successful `POST /weather` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub city: String,

    #[serde(rename = "temp_C", serialize_with = "serialize_compact")]
    pub temp_c: f64,

    #[serde(rename = "temp_F", serialize_with = "serialize_compact")]
    pub temp_f: f64,

    #[serde(rename = "temp_K", serialize_with = "serialize_compact")]
    pub temp_k: f64,
}

impl WeatherResult {
    /// Build the result for a city from its Celsius reading.
    pub fn from_celsius(city: impl Into<String>, celsius: f64) -> Self {
        Self {
            city: city.into(),
            temp_c: celsius,
            temp_f: celsius_to_fahrenheit(celsius),
            temp_k: celsius_to_kelvin(celsius),
        }
    }
}

/// Integral values render without a fractional part (`20`, not `20.0`).
fn serialize_compact<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
