//! Ingestion → validation → inference → labeling, end to end

use serde::Serialize;
use tracing::debug;

use crate::assembler::{self, LabelCount, ResultRow};
use crate::features::{FeatureVector, Sample};
use crate::inference::run_inference;
use crate::model::{Classifier, ModelId, ModelRegistry};
use crate::schema::{self, DecimalStyle, RawTable};
use crate::validator;
use crate::Result;

/// Predict every row of a raw table
///
/// Fails fast: any schema, validation or inference error aborts the whole
/// batch and no partial rows are returned.
pub fn predict_table(
    table: &RawTable,
    decimal: DecimalStyle,
    classifier: &dyn Classifier,
) -> Result<Vec<ResultRow>> {
    predict_samples(prepare(table, decimal)?, classifier)
}

/// Normalize and validate, before any model is involved
pub fn prepare(table: &RawTable, decimal: DecimalStyle) -> Result<Vec<Sample>> {
    validator::validate(&schema::normalize(table, decimal)?)
}

/// Predict already validated samples
pub fn predict_samples(samples: Vec<Sample>, classifier: &dyn Classifier) -> Result<Vec<ResultRow>> {
    let batch: Vec<FeatureVector> = samples.iter().map(|s| s.features).collect();
    let predictions = run_inference(classifier, &batch)?;
    debug!("Predicted {} rows", predictions.len());
    assembler::assemble(samples, predictions)
}

/// Everything the presentation layer shows for one run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub model: ModelId,
    pub model_name: &'static str,
    pub total_rows: usize,
    pub rows: Vec<ResultRow>,
    pub distribution: Vec<LabelCount>,
    /// Precomputed test-set accuracy of the model, when shipped
    pub accuracy: Option<f64>,
    /// Agreement with ground truth supplied in this batch
    pub agreement: Option<f64>,
}

impl Report {
    /// Validate the input, resolve the model, run the pipeline and summarize
    ///
    /// Input problems are reported before the model is looked up.
    pub fn build(
        registry: &ModelRegistry,
        model: ModelId,
        table: &RawTable,
        decimal: DecimalStyle,
    ) -> Result<Self> {
        let samples = prepare(table, decimal)?;
        let classifier = registry.resolve(model)?;
        let rows = predict_samples(samples, classifier.as_ref())?;
        Ok(Self {
            model,
            model_name: model.display_name(),
            total_rows: rows.len(),
            distribution: assembler::summarize(&rows),
            agreement: assembler::agreement(&rows),
            accuracy: registry.accuracy(model),
            rows,
        })
    }
}
