//! Model identifiers, the classifier seam and the registry
//!
//! Artifacts are opaque to the pipeline: anything implementing
//! [`Classifier`] can be served, and [`ArtifactLoader`] decides where
//! it comes from.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::features::FeatureVector;
use crate::quality::PredictedClass;
use crate::{Error, Result};

pub mod artifact;
pub mod registry;

pub use artifact::TreeModel;
pub use registry::{ArtifactLoader, JsonArtifactLoader, ModelRegistry};

/// Supported model identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelId {
    #[default]
    DecisionTree,
    GradientBoostedTree,
}

impl ModelId {
    pub const ALL: [ModelId; 2] = [ModelId::DecisionTree, ModelId::GradientBoostedTree];

    /// Identifier used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::DecisionTree => "decision-tree",
            ModelId::GradientBoostedTree => "gradient-boosted-tree",
        }
    }

    /// Name shown in the model selector
    pub fn display_name(self) -> &'static str {
        match self {
            ModelId::DecisionTree => "Árbol de Decisión",
            ModelId::GradientBoostedTree => "XGBoost",
        }
    }

    /// Serialized artifact file name, relative to the models directory
    pub fn artifact_file(self) -> &'static str {
        match self {
            ModelId::DecisionTree => "dt_classifier.json",
            ModelId::GradientBoostedTree => "xgb_classifier.json",
        }
    }

    /// Optional precomputed metrics file name
    pub fn metrics_file(self) -> &'static str {
        match self {
            ModelId::DecisionTree => "dt_classifier.metrics.json",
            ModelId::GradientBoostedTree => "xgb_classifier.metrics.json",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ModelId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| Error::ModelNotFound(format!("Unknown model identifier '{}'", s)))
    }
}

/// A loaded, immutable classifier
pub trait Classifier: Send + Sync {
    /// Feature names in the order the artifact expects its input
    fn feature_names(&self) -> &[String];

    /// Predict the class of one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<PredictedClass>;
}
