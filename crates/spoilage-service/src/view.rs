//! Presentation adapter.
//!
//! Turns the most recent readings into what the dashboard and the JSON
//! snapshot need: the table rows (newest first), chart series (oldest first)
//! and a summary of the latest reading.

use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

use spoilage_store::StoredReading;
use spoilage_types::Prediction;

/// Format a timestamp as a chart label, e.g. `2024-03-01 14:05:09`.
pub fn format_label(ts: OffsetDateTime) -> String {
    ts.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| ts.to_string())
}

/// Parallel chart arrays. All three always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub temps: Vec<f64>,
    pub hums: Vec<f64>,
}

impl ChartSeries {
    /// Build the series from readings already in chronological order.
    pub fn from_chronological(records: &[StoredReading]) -> Self {
        Self {
            labels: records.iter().map(|r| format_label(r.timestamp)).collect(),
            temps: records.iter().map(|r| r.temperature).collect(),
            hums: records.iter().map(|r| r.humidity).collect(),
        }
    }

    /// Number of points in the series.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if there are no points.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Headline values of the latest reading. Every field is `None` when the
/// store is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LatestSummary {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub light: Option<f64>,
    pub gas_level: Option<f64>,
    pub prediction: Option<Prediction>,
}

impl From<Option<&StoredReading>> for LatestSummary {
    fn from(latest: Option<&StoredReading>) -> Self {
        match latest {
            Some(r) => Self {
                temperature: Some(r.temperature),
                humidity: Some(r.humidity),
                light: Some(r.light),
                gas_level: Some(r.gas_level),
                prediction: Some(r.prediction),
            },
            None => Self::default(),
        }
    }
}

/// One row of the JSON snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub id: i64,
    pub timestamp: String,
    pub temperature: f64,
    pub humidity: f64,
    pub light: f64,
    pub gas_level: f64,
    pub prediction: Prediction,
}

impl From<&StoredReading> for RecordView {
    fn from(r: &StoredReading) -> Self {
        Self {
            id: r.id,
            timestamp: format_label(r.timestamp),
            temperature: r.temperature,
            humidity: r.humidity,
            light: r.light,
            gas_level: r.gas_level,
            prediction: r.prediction,
        }
    }
}

/// Everything the dashboard page shows.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    /// Recent readings, newest first.
    pub records: Vec<StoredReading>,
    /// Chart series, oldest first.
    pub chart: ChartSeries,
    /// The newest reading.
    pub latest: Option<StoredReading>,
}

impl DashboardView {
    /// Build the view from readings ordered newest first.
    pub fn from_recent(records: Vec<StoredReading>) -> Self {
        let chronological: Vec<StoredReading> = records.iter().rev().cloned().collect();
        Self {
            chart: ChartSeries::from_chronological(&chronological),
            latest: records.first().cloned(),
            records,
        }
    }

    /// The machine-readable form of this view.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            records: self.records.iter().map(RecordView::from).collect(),
            chart: self.chart.clone(),
            latest: LatestSummary::from(self.latest.as_ref()),
        }
    }
}

/// Body of `GET /data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub records: Vec<RecordView>,
    #[serde(flatten)]
    pub chart: ChartSeries,
    pub latest: LatestSummary,
}
