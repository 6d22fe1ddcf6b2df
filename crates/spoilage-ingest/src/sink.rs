//! Destinations for received serial lines.

use async_trait::async_trait;
use spoilage_types::parse_sensor_line;
use tracing::{debug, warn};

use crate::forward::ForwardClient;

/// Something that consumes received lines.
///
/// Sinks never fail the ingest loop; they log and carry on.
#[async_trait]
pub trait LineSink: Send + Sync {
    /// Handle one trimmed, non-blank line.
    async fn accept(&self, line: &str);
}

/// Prints every line to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

#[async_trait]
impl LineSink for ConsoleSink {
    async fn accept(&self, line: &str) {
        println!("{}", line);
    }
}

/// Submits lines that parse as readings to the web service.
#[derive(Debug, Clone)]
pub struct ForwardSink {
    client: ForwardClient,
}

impl ForwardSink {
    pub fn new(client: ForwardClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LineSink for ForwardSink {
    async fn accept(&self, line: &str) {
        let values = match parse_sensor_line(line) {
            Ok(values) => values,
            Err(e) => {
                debug!("Not forwarding line {:?}: {}", line, e);
                return;
            }
        };

        match self.client.submit(&values).await {
            Ok(()) => debug!("Forwarded reading to {}", self.client.base_url()),
            Err(e) => warn!("Failed to forward reading: {}", e),
        }
    }
}
