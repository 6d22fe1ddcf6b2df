//! Core types for spoilage sensor data.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Classification of a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Prediction {
    /// Storage conditions are acceptable.
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "OK"))]
    Ok,
    /// Storage conditions indicate spoilage.
    Spoiled,
}

impl Prediction {
    /// The label stored in the database and shown to users.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Ok => "OK",
            Prediction::Spoiled => "Spoiled",
        }
    }

    /// Returns `true` for [`Prediction::Spoiled`].
    #[must_use]
    pub fn is_spoiled(&self) -> bool {
        matches!(self, Prediction::Spoiled)
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Prediction {
    type Err = ParseError;

    /// Parses the exact stored labels `"OK"` and `"Spoiled"`.
    fn from_str(s: &str) -> ParseResult<Self> {
        match s {
            "OK" => Ok(Prediction::Ok),
            "Spoiled" => Ok(Prediction::Spoiled),
            other => Err(ParseError::UnknownPrediction(other.to_string())),
        }
    }
}

/// The four values reported by the sensor board for one observation.
///
/// Units follow the firmware: degrees Celsius, relative humidity in percent,
/// raw light level and raw gas sensor level.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorValues {
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
    pub gas_level: f64,
}

impl SensorValues {
    /// Create a new set of values.
    #[must_use]
    pub fn new(temperature: f64, humidity: f64, light: f64, gas_level: f64) -> Self {
        Self {
            temperature,
            humidity,
            light,
            gas_level,
        }
    }

    /// Parse the four values from their textual form.
    ///
    /// Every field must be a finite real number. Surrounding whitespace is
    /// ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use spoilage_types::SensorValues;
    ///
    /// let values = SensorValues::parse("22.5", " 40", "310", "420").unwrap();
    /// assert_eq!(values.humidity, 40.0);
    /// assert!(SensorValues::parse("abc", "40", "310", "420").is_err());
    /// ```
    pub fn parse(temperature: &str, humidity: &str, light: &str, gas_level: &str) -> ParseResult<Self> {
        Ok(Self {
            temperature: parse_value("temperature", temperature)?,
            humidity: parse_value("humidity", humidity)?,
            light: parse_value("light", light)?,
            gas_level: parse_value("gas_level", gas_level)?,
        })
    }

    /// Feature vector in model input order: temperature, humidity, light, gas level.
    #[must_use]
    pub fn features(&self) -> [f64; 4] {
        [self.temperature, self.humidity, self.light, self.gas_level]
    }
}

/// Parse one sensor value, rejecting anything that is not a finite number.
pub fn parse_value(field: &'static str, raw: &str) -> ParseResult<f64> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParseError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}
