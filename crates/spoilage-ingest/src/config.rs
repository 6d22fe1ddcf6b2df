//! Ingest configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spoilage_core::serial::{DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT, SerialSettings};
use tracing::warn;

/// Ingest configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Serial port settings.
    pub serial: SerialConfig,
    /// Forwarding to the web service.
    pub forward: ForwardConfig,
}

impl IngestConfig {
    /// Load configuration from `path` if it exists, otherwise use defaults.
    ///
    /// An unreadable or malformed file is logged and ignored.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            warn!("Ignoring config file, using defaults: {}", e);
            Self::default()
        })
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = self.serial.validate();
        errors.extend(self.forward.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Serial port configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path (e.g., "/dev/ttyUSB0" or "COM3").
    pub port: String,
    /// Must match the rate the board passes to `Serial.begin`.
    pub baud_rate: u32,
    /// Upper bound on a single blocking read, in milliseconds.
    pub timeout_ms: u64,
    /// Pause after opening while the board resets, in milliseconds.
    pub reset_delay_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_port().to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            reset_delay_ms: 2000,
        }
    }
}

impl SerialConfig {
    /// Connection settings for [`spoilage_core::serial::open_port`].
    pub fn settings(&self) -> SerialSettings {
        SerialSettings {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }

    /// Validate serial configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.port.trim().is_empty() {
            errors.push(ValidationError {
                field: "serial.port".to_string(),
                message: "port cannot be empty".to_string(),
            });
        }
        if self.baud_rate == 0 {
            errors.push(ValidationError {
                field: "serial.baud_rate".to_string(),
                message: "baud rate must be greater than 0".to_string(),
            });
        }
        if self.timeout_ms == 0 {
            errors.push(ValidationError {
                field: "serial.timeout_ms".to_string(),
                message: "read timeout must be greater than 0".to_string(),
            });
        }

        errors
    }
}

/// Forwarding configuration. Disabled when `url` is unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardConfig {
    /// Base URL of the web service (e.g., "http://127.0.0.1:5000").
    pub url: Option<String>,
}

impl ForwardConfig {
    /// Validate forwarding configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if let Some(url) = &self.url
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            errors.push(ValidationError {
                field: "forward.url".to_string(),
                message: format!("URL must start with http:// or https://, got: {}", url),
            });
        }

        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `serial.port`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

fn default_port() -> &'static str {
    if cfg!(windows) { "COM3" } else { "/dev/ttyUSB0" }
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spoilage")
        .join("ingest.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = IngestConfig::default();
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.serial.timeout_ms, 2000);
        assert_eq!(config.serial.reset_delay(), Duration::from_secs(2));
        assert!(config.forward.url.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_settings_from_config() {
        let serial = SerialConfig {
            port: "/dev/ttyACM0".to_string(),
            baud_rate: 9600,
            timeout_ms: 500,
            reset_delay_ms: 0,
        };
        let settings = serial.settings();
        assert_eq!(settings.port, "/dev/ttyACM0");
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_config_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ingest.toml");
        std::fs::write(
            &path,
            r#"
            [serial]
            port = "COM4"
            reset_delay_ms = 100

            [forward]
            url = "http://127.0.0.1:5000"
            "#,
        )
        .unwrap();

        let config = IngestConfig::load(&path).unwrap();
        assert_eq!(config.serial.port, "COM4");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.serial.reset_delay_ms, 100);
        assert_eq!(config.forward.url.as_deref(), Some("http://127.0.0.1:5000"));
    }

    #[test]
    fn test_load_or_default_ignores_malformed_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.toml");
        std::fs::write(&path, "[unterminated").unwrap();

        let config = IngestConfig::load_or_default(&path);
        config.validate().unwrap();
        assert_eq!(
            toml::to_string(&config).unwrap(),
            toml::to_string(&IngestConfig::default()).unwrap()
        );
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = IngestConfig::load_or_default("/nonexistent/path/config.toml");
        config.validate().unwrap();
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = IngestConfig::load("/nonexistent/path/ingest.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("invalid.toml");
        std::fs::write(&path, "[serial\nport = ").unwrap();

        let result = IngestConfig::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validation_errors() {
        let config = IngestConfig {
            serial: SerialConfig {
                port: " ".to_string(),
                baud_rate: 0,
                timeout_ms: 0,
                reset_delay_ms: 0,
            },
            forward: ForwardConfig {
                url: Some("localhost:5000".to_string()),
            },
        };

        let err = config.validate().unwrap_err();
        let ConfigError::Validation(errors) = &err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 4);

        let display = err.to_string();
        assert!(display.contains("serial.port: port cannot be empty"));
        assert!(display.contains("forward.url"));
    }

    #[test]
    fn test_default_config_path() {
        assert!(default_config_path().ends_with("spoilage/ingest.toml"));
    }
}
