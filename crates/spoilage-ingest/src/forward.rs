//! HTTP client that submits readings to the web service.
//!
//! Readings are posted to `POST /predict` as a form, exactly as the
//! dashboard's own form would submit them. The service classifies and stores
//! the reading; the rendered page in the response is discarded.

use std::time::Duration;

use reqwest::Client;
use spoilage_types::SensorValues;

use crate::error::{Error, Result};

/// Client for the service's prediction endpoint.
#[derive(Debug, Clone)]
pub struct ForwardClient {
    client: Client,
    base_url: String,
}

impl ForwardClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the service (e.g., "http://127.0.0.1:5000")
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(Error::Request)?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit one reading for classification and storage.
    pub async fn submit(&self, values: &SensorValues) -> Result<()> {
        let url = format!("{}/predict", self.base_url);
        let form = [
            ("temperature", values.temperature.to_string()),
            ("humidity", values.humidity.to_string()),
            ("light", values.light.to_string()),
            ("gas_level", values.gas_level.to_string()),
        ];

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
