//! # Vinos Common Library
//!
//! Shared code for the wine-quality dashboard and loader:
//! - Canonical feature schema and sample types
//! - Schema normalization and feature validation
//! - Model artifacts, registry and inference
//! - Quality labels and result assembly
//! - Configuration, database access and the sample-data cache

pub mod assembler;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod inference;
pub mod model;
pub mod pipeline;
pub mod quality;
pub mod schema;
pub mod validator;

pub use error::{Error, Result};
pub use features::{Feature, FeatureVector, Sample};
pub use model::{Classifier, ModelId, ModelRegistry};
pub use quality::{PredictedClass, QualityLabel};
pub use schema::{DecimalStyle, RawTable, RawValue};
