//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when the sample-data path is disabled
    pub status: String,
    pub module: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Whether a database connection string was found at startup
    pub database_configured: bool,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let database_configured = state.database.is_configured();

    Json(HealthResponse {
        status: if database_configured { "ok" } else { "degraded" }.to_string(),
        module: "vinos-dash".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
        database_configured,
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
