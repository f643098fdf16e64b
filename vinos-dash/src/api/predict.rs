//! Prediction over an uploaded file
//!
//! The request body is the delimited file itself; query parameters pick
//! the model and decimal convention.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use vinos_common::pipeline::Report;
use vinos_common::schema::DEFAULT_DELIMITER;
use vinos_common::{DecimalStyle, RawTable};

use super::{build_report, parse_model};
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for prediction
#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    /// Model identifier ("decision-tree" or "gradient-boosted-tree")
    pub model: Option<String>,
    /// "comma" or "point"; defaults to the configured style
    pub decimal: Option<String>,
}

/// POST /api/predict
pub async fn predict_upload(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
    body: String,
) -> ApiResult<Json<Report>> {
    debug!("POST /api/predict: {} bytes, query {:?}", body.len(), query);
    let model = parse_model(query.model.as_deref())?;
    let decimal = match query.decimal.as_deref() {
        Some(style) => style
            .parse::<DecimalStyle>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => state.decimal,
    };

    if body.trim().is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    let table = RawTable::from_csv_str(&body, DEFAULT_DELIMITER)?;
    let report = build_report(&state, model, Arc::new(table), decimal).await?;
    info!("Predicted {} uploaded rows with {}", report.total_rows, model);

    Ok(Json(report))
}
