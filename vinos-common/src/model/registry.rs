//! Model registry
//!
//! Resolves a [`ModelId`] to a shared classifier, loading each artifact at
//! most once per process. Loaded classifiers are never mutated, so handing
//! out `Arc` clones to concurrent requests is safe.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use super::{Classifier, ModelId, TreeModel};
use crate::{Error, Result};

/// Source of model artifacts
pub trait ArtifactLoader: Send + Sync {
    /// Deserialize the artifact behind `id`
    fn load(&self, id: ModelId) -> Result<Arc<dyn Classifier>>;

    /// Precomputed accuracy, if the artifact ships one
    fn accuracy(&self, _id: ModelId) -> Result<Option<f64>> {
        Ok(None)
    }

    /// Whether an artifact for `id` is present, without loading it
    fn exists(&self, _id: ModelId) -> bool {
        true
    }
}

#[derive(Debug, Deserialize)]
struct MetricsFile {
    accuracy: f64,
}

/// Loads JSON tree artifacts from a directory
#[derive(Debug, Clone)]
pub struct JsonArtifactLoader {
    dir: PathBuf,
}

impl JsonArtifactLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn artifact_path(&self, id: ModelId) -> PathBuf {
        self.dir.join(id.artifact_file())
    }
}

impl ArtifactLoader for JsonArtifactLoader {
    fn load(&self, id: ModelId) -> Result<Arc<dyn Classifier>> {
        let path = self.artifact_path(id);
        if !path.exists() {
            return Err(Error::ModelNotFound(format!(
                "{}: artifact {} is missing",
                id,
                path.display()
            )));
        }

        let model = TreeModel::from_path(&path).map_err(|e| {
            Error::ModelNotFound(format!("{}: corrupt artifact {}: {}", id, path.display(), e))
        })?;
        Ok(Arc::new(model))
    }

    fn accuracy(&self, id: ModelId) -> Result<Option<f64>> {
        let path = self.dir.join(id.metrics_file());
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        let metrics: MetricsFile = serde_json::from_str(&text).map_err(|e| {
            Error::ModelNotFound(format!("{}: unreadable metrics {}: {}", id, path.display(), e))
        })?;
        Ok(Some(metrics.accuracy))
    }

    fn exists(&self, id: ModelId) -> bool {
        self.artifact_path(id).exists()
    }
}

/// Process-wide cache of loaded classifiers
pub struct ModelRegistry {
    loader: Box<dyn ArtifactLoader>,
    loaded: RwLock<HashMap<ModelId, Arc<dyn Classifier>>>,
}

impl ModelRegistry {
    pub fn new(loader: Box<dyn ArtifactLoader>) -> Self {
        Self {
            loader,
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Registry over JSON artifacts in `dir`
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(JsonArtifactLoader::new(dir)))
    }

    /// Return the classifier for `id`, loading it on first use
    ///
    /// Failed loads are not cached; the next request tries again. The first
    /// call for an id reads the artifact while holding the write lock, so
    /// async callers should run this on the blocking pool.
    pub fn resolve(&self, id: ModelId) -> Result<Arc<dyn Classifier>> {
        if let Some(model) = self
            .loaded
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
        {
            return Ok(Arc::clone(model));
        }

        // held across the load so two first requests cannot both deserialize
        let mut loaded = self.loaded.write().unwrap_or_else(|e| e.into_inner());
        if let Some(model) = loaded.get(&id) {
            return Ok(Arc::clone(model));
        }

        let model = self.loader.load(id)?;
        info!("Loaded model artifact {}", id);
        loaded.insert(id, Arc::clone(&model));
        Ok(model)
    }

    /// Parse an identifier from the boundary and resolve it
    pub fn resolve_str(&self, id: &str) -> Result<Arc<dyn Classifier>> {
        self.resolve(id.parse()?)
    }

    /// Precomputed accuracy for `id`; unreadable metrics degrade to `None`
    pub fn accuracy(&self, id: ModelId) -> Option<f64> {
        match self.loader.accuracy(id) {
            Ok(accuracy) => accuracy,
            Err(e) => {
                warn!("Ignoring metrics for {}: {}", id, e);
                None
            }
        }
    }

    /// Models whose artifacts are present, in display order
    pub fn available(&self) -> Vec<ModelId> {
        ModelId::ALL
            .into_iter()
            .filter(|&id| self.loader.exists(id))
            .collect()
    }

    pub fn is_loaded(&self, id: ModelId) -> bool {
        self.loaded
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&id)
    }
}
