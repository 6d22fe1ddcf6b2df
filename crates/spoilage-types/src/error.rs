//! Error types for sensor value parsing in spoilage-types.

use thiserror::Error;

/// Errors that can occur when parsing sensor values or predictions.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    /// A field was not a finite real number.
    #[error("Invalid value for {field}: {value:?}")]
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
        /// The raw text that failed to parse.
        value: String,
    },

    /// A required field was not present.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A prediction label was neither "OK" nor "Spoiled".
    #[error("Unknown prediction: {0:?}")]
    UnknownPrediction(String),
}

/// Result type alias using spoilage-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
