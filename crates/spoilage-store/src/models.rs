//! Data models for stored data.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use spoilage_types::{Prediction, SensorValues};

/// A reading about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub values: SensorValues,
    /// Classification computed before insertion.
    pub prediction: Prediction,
    /// Observation time. `None` means "now".
    pub timestamp: Option<OffsetDateTime>,
}

impl NewReading {
    /// A reading stamped with the insertion time.
    pub fn new(values: SensorValues, prediction: Prediction) -> Self {
        Self {
            values,
            prediction,
            timestamp: None,
        }
    }

    /// Use an explicit observation time.
    pub fn at(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A reading stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    /// Database row ID.
    pub id: i64,
    /// Temperature in Celsius.
    pub temperature: f64,
    /// Relative humidity percentage.
    pub humidity: f64,
    /// Raw light level.
    pub light: f64,
    /// Raw gas sensor level.
    pub gas_level: f64,
    /// Classification stored at insertion time.
    pub prediction: Prediction,
    /// When this reading was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl StoredReading {
    /// The sensor values of this row.
    pub fn values(&self) -> SensorValues {
        SensorValues::new(self.temperature, self.humidity, self.light, self.gas_level)
    }
}

/// Result ordering for [`Store::recent`](crate::Store::recent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Most recent first, for tables and the JSON snapshot.
    #[default]
    NewestFirst,
    /// Chronological, for charts.
    OldestFirst,
}
