//! Error types for spoilage-core.
//!
//! Only two kinds of failure leave this crate: a serial port that cannot be
//! opened or read, and a model artifact that cannot be loaded. Inference
//! errors are recovered inside the classifier and only logged.

use std::path::PathBuf;

/// Result type for spoilage-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in spoilage-core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to read the model artifact from disk.
    #[error("Failed to read model {path}: {source}")]
    ModelRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The model artifact is not a valid model document.
    #[error("Invalid model {path}: {source}")]
    ModelFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The model rejected its input or produced unusable output.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Failed to open the serial port.
    #[error("Could not open serial port {port}: {source}")]
    SerialOpen {
        port: String,
        source: serialport::Error,
    },

    /// IO error while reading from the serial port.
    #[error("Serial read error: {0}")]
    Io(#[from] std::io::Error),
}
