//! Model listing

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::debug;
use vinos_common::ModelId;

use crate::AppState;

/// One selectable model
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: ModelId,
    pub name: &'static str,
    /// Precomputed accuracy, when a metrics file ships with the artifact
    pub accuracy: Option<f64>,
    /// Whether an artifact file is present
    pub available: bool,
    /// Whether the artifact has been deserialized in this process
    pub loaded: bool,
}

/// GET /api/models
pub async fn list_models(State(state): State<AppState>) -> Json<Vec<ModelInfo>> {
    debug!("GET /api/models");
    let available = state.registry.available();
    Json(
        ModelId::ALL
            .iter()
            .map(|&id| ModelInfo {
                id,
                name: id.display_name(),
                accuracy: state.registry.accuracy(id),
                available: available.contains(&id),
                loaded: state.registry.is_loaded(id),
            })
            .collect(),
    )
}
