//! Web dashboard and JSON API for medicine storage spoilage monitoring.
//!
//! The service classifies readings submitted through a form, stores them and
//! shows the most recent ones on a dashboard.
//!
//! # Endpoints
//!
//! - `GET /` - Dashboard with a chart, the latest reading and a prediction form
//! - `POST /predict` - Classify, store and re-render with the result
//! - `GET /data` - JSON snapshot of the 10 most recent readings
//! - `GET /api/health` - Service health check
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/spoilage/server.toml`:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:5000"
//!
//! [storage]
//! path = "~/.local/share/spoilage/readings.db"
//!
//! [model]
//! path = "~/.local/share/spoilage/models/spoilage_model.json"
//! ```
//!
//! When the model file is missing or cannot be loaded, the threshold rule is
//! used instead.

pub mod api;
pub mod config;
pub mod render;
pub mod state;
pub mod view;

pub use config::{Config, ConfigError, ModelConfig, ServerConfig, StorageConfig};
pub use state::AppState;
pub use view::{ChartSeries, DashboardView, LatestSummary, RecordView, Snapshot};
