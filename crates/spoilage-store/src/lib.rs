//! Local persistence for classified sensor readings.
//!
//! This crate provides SQLite-based storage for readings together with the
//! classification computed when they were received.
//!
//! # Features
//!
//! - Append a reading, getting back its id and timestamp
//! - Fetch the N most recent readings, newest first or chronologically
//! - Schema created automatically on first open
//!
//! # Example
//!
//! ```
//! use spoilage_store::{NewReading, Order, Store};
//! use spoilage_types::{Prediction, SensorValues};
//!
//! let store = Store::open_in_memory()?;
//! let values = SensorValues::new(22.5, 40.0, 310.0, 420.0);
//! store.insert(&NewReading::new(values, Prediction::Ok))?;
//!
//! let recent = store.recent(10, Order::NewestFirst)?;
//! assert_eq!(recent.len(), 1);
//! # Ok::<(), spoilage_store::Error>(())
//! ```

mod error;
mod models;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{NewReading, Order, StoredReading};
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/spoilage/readings.db`
/// - macOS: `~/Library/Application Support/spoilage/readings.db`
/// - Windows: `C:\Users\<user>\AppData\Local\spoilage\readings.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("spoilage")
        .join("readings.db")
}
