//! Platform-agnostic types for spoilage monitoring.
//!
//! This crate provides the types shared by the classifier, the reading store,
//! the HTTP service and the serial ingester.
//!
//! # Features
//!
//! - [`SensorValues`]: one observation of temperature, humidity, light and gas level
//! - [`Prediction`]: the `"OK"` / `"Spoiled"` classification
//! - Parsing helpers for form fields and serial lines
//!
//! # Example
//!
//! ```
//! use spoilage_types::{Prediction, SensorValues};
//!
//! let values = SensorValues::parse("22.5", "40", "310", "420")?;
//! assert_eq!(values.features(), [22.5, 40.0, 310.0, 420.0]);
//! assert_eq!(Prediction::Spoiled.to_string(), "Spoiled");
//! # Ok::<(), spoilage_types::ParseError>(())
//! ```

pub mod error;
pub mod line;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use line::parse_sensor_line;
pub use types::{Prediction, SensorValues, parse_value};
