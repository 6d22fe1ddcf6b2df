//! HTTP handlers for the dashboard and JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Dashboard page with the most recent readings |
//! | POST | `/predict` | Classify a submitted reading, store it and re-render the dashboard |
//! | GET | `/data` | JSON snapshot of the most recent readings |
//! | GET | `/api/health` | Service health check |
//!
//! `GET /` and `GET /data` report store failures as HTTP 500 with a JSON body
//! via [`AppError`]. `POST /predict` collapses every failure into a single
//! plain-text 400 response.
//!
//! # Example
//!
//! ```ignore
//! use spoilage_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, error};

use spoilage_store::{NewReading, Order};
use spoilage_types::{ParseError, SensorValues};

use crate::render::{RenderError, render_dashboard};
use crate::state::AppState;
use crate::view::{DashboardView, Snapshot};

/// Number of readings shown on the dashboard and returned by `/data`.
pub const RECENT_LIMIT: u32 = 10;

/// Body returned for any failed prediction request.
pub const PREDICT_FAILURE: &str = "Invalid input or server error";

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/data", get(data))
        .route("/api/health", get(health))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Name of the active classifier (`model` or `rule`).
    pub classifier: &'static str,
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        classifier: state.classifier.name(),
    })
}

async fn load_view(state: &AppState) -> Result<DashboardView, AppError> {
    let records = state
        .store
        .lock()
        .await
        .recent(RECENT_LIMIT, Order::NewestFirst)?;
    Ok(DashboardView::from_recent(records))
}

/// Dashboard page.
async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let view = load_view(&state).await?;
    let html = render_dashboard(&view, None)?;
    Ok(Html(html))
}

/// JSON snapshot of recent readings.
async fn data(State(state): State<Arc<AppState>>) -> Result<Json<Snapshot>, AppError> {
    let view = load_view(&state).await?;
    Ok(Json(view.snapshot()))
}

/// Form fields submitted to `/predict`.
///
/// Fields are kept as raw text so that missing and malformed values both end
/// up in the same error path.
#[derive(Debug, Default, Deserialize)]
pub struct PredictForm {
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub light: Option<String>,
    pub gas_level: Option<String>,
}

impl PredictForm {
    /// Parse the four fields into sensor values.
    pub fn values(&self) -> Result<SensorValues, ParseError> {
        fn field<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ParseError> {
            value.as_deref().ok_or(ParseError::MissingField(name))
        }

        SensorValues::parse(
            field(&self.temperature, "temperature")?,
            field(&self.humidity, "humidity")?,
            field(&self.light, "light")?,
            field(&self.gas_level, "gas_level")?,
        )
    }
}

/// Classify a submitted reading, persist it and re-render the dashboard.
async fn predict(
    State(state): State<Arc<AppState>>,
    form: Result<Form<PredictForm>, FormRejection>,
) -> Response {
    let result = async {
        let Form(form) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;
        let values = form.values()?;
        let prediction = state.classifier.classify(&values);
        debug!(?values, %prediction, "Classified submitted reading");

        let view = {
            let store = state.store.lock().await;
            store.insert(&NewReading::new(values, prediction))?;
            DashboardView::from_recent(store.recent(RECENT_LIMIT, Order::NewestFirst)?)
        };

        Ok::<_, AppError>(render_dashboard(&view, Some(prediction))?)
    }
    .await;

    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Prediction request failed: {}", e);
            (StatusCode::BAD_REQUEST, PREDICT_FAILURE).into_response()
        }
    }
}

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid reading: {0}")]
    Parse(#[from] ParseError),
    #[error("Store error: {0}")]
    Store(#[from] spoilage_store::Error),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) | AppError::Parse(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{}", self);
        }

        let body = serde_json::json!({
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}
