//! Prediction over reference rows from the database
//!
//! Sample rows are cached with a TTL. A missing connection string or a
//! failed query never fails the request: the response carries a warning
//! and no report, and the upload path keeps working.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use vinos_common::pipeline::Report;
use vinos_common::{db, DecimalStyle};

use super::{build_report, parse_model};
use crate::{ApiResult, AppState, DatabaseSource};

/// Query parameters for sample prediction
#[derive(Debug, Deserialize)]
pub struct SampleQuery {
    pub model: Option<String>,
}

/// Sample prediction response
#[derive(Debug, Serialize)]
pub struct SampleResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// When the cached rows were loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl SampleResponse {
    fn degraded(warning: String) -> Self {
        Self {
            report: None,
            warning: Some(warning),
            refreshed_at: None,
        }
    }
}

/// GET /api/samples
pub async fn predict_samples(
    State(state): State<AppState>,
    Query(query): Query<SampleQuery>,
) -> ApiResult<Json<SampleResponse>> {
    debug!("GET /api/samples: {:?}", query);
    let model = parse_model(query.model.as_deref())?;

    let url = match &state.database {
        DatabaseSource::Configured(url) => url.clone(),
        DatabaseSource::Unavailable(reason) => {
            warn!("Sample data unavailable: {}", reason);
            return Ok(Json(SampleResponse::degraded(reason.clone())));
        }
    };

    let limit = state.sample_limit;
    let fetched = state
        .samples
        .get_or_refresh(move || async move { db::fetch_samples(&url, limit).await.map(Arc::new) })
        .await;
    let table = match fetched {
        Ok(table) => table,
        Err(e) => {
            warn!("Sample data load failed: {}", e);
            return Ok(Json(SampleResponse::degraded(format!(
                "Could not load sample data: {}",
                e
            ))));
        }
    };

    // numeric columns from the database need no decimal handling
    let report = build_report(&state, model, table, DecimalStyle::Point).await?;

    Ok(Json(SampleResponse {
        report: Some(report),
        warning: None,
        refreshed_at: state.samples.refreshed_at().await,
    }))
}

/// POST /api/samples/refresh
///
/// Drops cached sample rows; the next `GET /api/samples` reloads them.
pub async fn refresh_samples(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.samples.invalidate().await;
    info!("Sample data cache invalidated");
    Json(serde_json::json!({ "invalidated": true }))
}
