//! vinos-dash library - wine-quality prediction dashboard
//!
//! Upload a CSV or pull reference rows from the database, run one of the
//! registered classifiers over them and return labeled results.

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use vinos_common::cache::TtlCache;
use vinos_common::config::Settings;
use vinos_common::{DecimalStyle, ModelRegistry, RawTable};

pub mod api;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

/// Where sample data comes from, decided once at startup
#[derive(Debug, Clone)]
pub enum DatabaseSource {
    /// Connection string to open per query
    Configured(String),
    /// Why the sample-data path is disabled
    Unavailable(String),
}

impl DatabaseSource {
    pub fn is_configured(&self) -> bool {
        matches!(self, DatabaseSource::Configured(_))
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded classifiers, shared read-only
    pub registry: Arc<ModelRegistry>,
    /// Sample-data source
    pub database: DatabaseSource,
    /// Cached sample rows with passive expiry
    pub samples: Arc<TtlCache<Arc<RawTable>>>,
    /// Row limit of the sample query, `None` for the whole table
    pub sample_limit: Option<u32>,
    /// Decimal convention assumed for uploads without an explicit one
    pub decimal: DecimalStyle,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(registry: ModelRegistry, database: DatabaseSource, settings: &Settings) -> Self {
        Self {
            registry: Arc::new(registry),
            database,
            samples: Arc::new(TtlCache::new(Duration::from_secs(settings.sample_ttl_secs))),
            sample_limit: settings.sample_limit.filter(|&limit| limit > 0),
            decimal: settings.decimal,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/api/models", get(api::list_models))
        .route("/api/predict", post(api::predict_upload))
        .route("/api/samples", get(api::predict_samples))
        .route("/api/samples/refresh", post(api::refresh_samples))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
