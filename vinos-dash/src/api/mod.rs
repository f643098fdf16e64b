//! HTTP API handlers for vinos-dash

pub mod health;
pub mod models;
pub mod predict;
pub mod samples;
pub mod ui;

pub use health::health_routes;
pub use models::list_models;
pub use predict::predict_upload;
pub use samples::{predict_samples, refresh_samples};
pub use ui::serve_index;

use std::sync::Arc;
use vinos_common::pipeline::Report;
use vinos_common::{DecimalStyle, ModelId, RawTable};

use crate::{ApiError, ApiResult, AppState};

/// Parse the optional `model` query parameter, defaulting to the decision tree
pub(crate) fn parse_model(model: Option<&str>) -> ApiResult<ModelId> {
    match model {
        Some(id) if !id.trim().is_empty() => Ok(id.parse()?),
        _ => Ok(ModelId::default()),
    }
}

/// Build a report on the blocking pool
///
/// The first request for a model reads its artifact from disk under the
/// registry lock; that must not stall the async workers.
pub(crate) async fn build_report(
    state: &AppState,
    model: ModelId,
    table: Arc<RawTable>,
    decimal: DecimalStyle,
) -> ApiResult<Report> {
    let registry = Arc::clone(&state.registry);
    let report = tokio::task::spawn_blocking(move || {
        Report::build(&registry, model, &table, decimal)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Task join error: {}", e)))??;
    Ok(report)
}
