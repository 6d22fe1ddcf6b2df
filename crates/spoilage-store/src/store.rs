//! Main store implementation.

use std::path::Path;

use rusqlite::Connection;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{NewReading, Order, StoredReading};
use crate::schema;

/// SQLite-based store for classified readings.
///
/// The table is append-only: there is no update or delete.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Insert a reading and return it with its assigned id and timestamp.
    ///
    /// Timestamps are stored with second precision.
    pub fn insert(&self, reading: &NewReading) -> Result<StoredReading> {
        let timestamp = reading
            .timestamp
            .unwrap_or_else(OffsetDateTime::now_utc)
            .unix_timestamp();
        let v = &reading.values;

        self.conn.execute(
            "INSERT INTO sensor_data (temperature, humidity, light, gas_level, prediction, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                v.temperature,
                v.humidity,
                v.light,
                v.gas_level,
                reading.prediction.as_str(),
                timestamp,
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        debug!("Inserted reading {} ({})", id, reading.prediction);

        Ok(StoredReading {
            id,
            temperature: v.temperature,
            humidity: v.humidity,
            light: v.light,
            gas_level: v.gas_level,
            prediction: reading.prediction,
            timestamp: to_datetime(timestamp)?,
        })
    }

    /// Up to `limit` most recent readings.
    ///
    /// Recency is by timestamp, then by id. [`Order::OldestFirst`] returns the
    /// same rows as [`Order::NewestFirst`], reversed.
    pub fn recent(&self, limit: u32, order: Order) -> Result<Vec<StoredReading>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, temperature, humidity, light, gas_level, prediction, timestamp
             FROM sensor_data ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;

        let rows = stmt
            .query_map([limit], |row| {
                Ok(RawReading {
                    id: row.get(0)?,
                    temperature: row.get(1)?,
                    humidity: row.get(2)?,
                    light: row.get(3)?,
                    gas_level: row.get(4)?,
                    prediction: row.get(5)?,
                    timestamp: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut readings = rows
            .into_iter()
            .map(RawReading::into_stored)
            .collect::<Result<Vec<_>>>()?;

        if order == Order::OldestFirst {
            readings.reverse();
        }

        Ok(readings)
    }

    /// The most recent reading, if any.
    pub fn latest(&self) -> Result<Option<StoredReading>> {
        Ok(self.recent(1, Order::NewestFirst)?.pop())
    }

    /// Total number of stored readings.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sensor_data", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// A row as read from SQLite, before validation.
struct RawReading {
    id: i64,
    temperature: f64,
    humidity: f64,
    light: f64,
    gas_level: f64,
    prediction: String,
    timestamp: i64,
}

impl RawReading {
    fn into_stored(self) -> Result<StoredReading> {
        Ok(StoredReading {
            id: self.id,
            temperature: self.temperature,
            humidity: self.humidity,
            light: self.light,
            gas_level: self.gas_level,
            prediction: self.prediction.parse()?,
            timestamp: to_datetime(self.timestamp)?,
        })
    }
}

fn to_datetime(ts: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(ts).map_err(|_| Error::InvalidTimestamp(ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spoilage_types::{Prediction, SensorValues};
    use time::Duration;

    fn reading(temperature: f64, prediction: Prediction) -> NewReading {
        NewReading::new(SensorValues::new(temperature, 50.0, 100.0, 500.0), prediction)
    }

    fn base_time() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.latest().unwrap().is_none());
        assert!(store.recent(10, Order::NewestFirst).unwrap().is_empty());
    }

    #[test]
    fn test_insert_assigns_id_and_timestamp() {
        let store = Store::open_in_memory().unwrap();
        let before = OffsetDateTime::now_utc().unix_timestamp();

        let first = store.insert(&reading(20.0, Prediction::Ok)).unwrap();
        let second = store.insert(&reading(30.0, Prediction::Spoiled)).unwrap();

        assert!(second.id > first.id);
        assert!(first.timestamp.unix_timestamp() >= before);
        assert_eq!(second.prediction, Prediction::Spoiled);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_insert_keeps_explicit_timestamp() {
        let store = Store::open_in_memory().unwrap();
        let stored = store
            .insert(&reading(20.0, Prediction::Ok).at(base_time()))
            .unwrap();
        assert_eq!(stored.timestamp, base_time());

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest, stored);
    }

    #[test]
    fn test_recent_limits_and_orders() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..15 {
            store
                .insert(&reading(i as f64, Prediction::Ok).at(base_time() + Duration::minutes(i)))
                .unwrap();
        }

        let newest = store.recent(10, Order::NewestFirst).unwrap();
        assert_eq!(newest.len(), 10);
        assert_eq!(newest[0].temperature, 14.0);
        assert_eq!(newest[9].temperature, 5.0);

        let mut oldest = store.recent(10, Order::OldestFirst).unwrap();
        assert_eq!(oldest[0].temperature, 5.0);
        oldest.reverse();
        assert_eq!(oldest, newest);
    }

    #[test]
    fn test_recent_orders_by_timestamp_not_id() {
        let store = Store::open_in_memory().unwrap();
        store
            .insert(&reading(1.0, Prediction::Ok).at(base_time() + Duration::hours(1)))
            .unwrap();
        store
            .insert(&reading(2.0, Prediction::Ok).at(base_time()))
            .unwrap();

        let newest = store.recent(10, Order::NewestFirst).unwrap();
        assert_eq!(newest[0].temperature, 1.0);
        assert_eq!(newest[1].temperature, 2.0);
    }

    #[test]
    fn test_same_second_ties_break_by_id() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..3 {
            store
                .insert(&reading(i as f64, Prediction::Ok).at(base_time()))
                .unwrap();
        }

        let newest = store.recent(2, Order::NewestFirst).unwrap();
        assert_eq!(newest[0].temperature, 2.0);
        assert_eq!(newest[1].temperature, 1.0);
    }

    #[test]
    fn test_recent_with_fewer_rows_than_limit() {
        let store = Store::open_in_memory().unwrap();
        store.insert(&reading(20.0, Prediction::Ok)).unwrap();
        assert_eq!(store.recent(10, Order::OldestFirst).unwrap().len(), 1);
        assert!(store.recent(0, Order::NewestFirst).unwrap().is_empty());
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("readings.db");

        {
            let store = Store::open(&path).unwrap();
            store.insert(&reading(21.0, Prediction::Ok)).unwrap();
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.latest().unwrap().unwrap().temperature, 21.0);
    }

    #[test]
    fn test_stored_reading_serializes_fields() {
        let store = Store::open_in_memory().unwrap();
        let stored = store
            .insert(&reading(26.0, Prediction::Spoiled).at(base_time()))
            .unwrap();

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["prediction"], "Spoiled");
        assert_eq!(json["temperature"], 26.0);
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20Z");
    }
}
