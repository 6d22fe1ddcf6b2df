//! Error types for spoilage-store.

use std::path::PathBuf;

/// Result type for spoilage-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in spoilage-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored timestamp is out of range.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),

    /// A stored prediction label is not recognised.
    #[error("Invalid stored prediction: {0}")]
    InvalidPrediction(#[from] spoilage_types::ParseError),
}
