//! Error types for serial ingestion.

/// Errors raised while ingesting or forwarding readings.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Opening or reading the serial port failed.
    #[error(transparent)]
    Serial(#[from] spoilage_core::Error),

    /// The forward URL is not an http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The service could not be reached.
    #[error("Service not reachable at {url}: {source}")]
    NotReachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP client error.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Service rejected reading with status {status}")]
    Rejected { status: u16 },

    /// The blocking reader task panicked or was aborted.
    #[error("Reader task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, Error>;
