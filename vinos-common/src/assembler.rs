//! Result assembler
//!
//! Joins every sample with its prediction. Rows are zipped, never looked
//! up, so output order and count always match the input.

use serde::Serialize;
use std::collections::HashMap;

use crate::features::{FeatureVector, Sample};
use crate::quality::{GroundTruth, PredictedClass, QualityLabel};
use crate::{Error, Result};

/// One display row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub features: FeatureVector,
    pub predicted: QualityLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<GroundTruth>,
}

/// Frequency of one predicted label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: QualityLabel,
    pub count: usize,
}

/// Pair samples with their predictions
pub fn assemble(samples: Vec<Sample>, predictions: Vec<PredictedClass>) -> Result<Vec<ResultRow>> {
    if samples.len() != predictions.len() {
        return Err(Error::Inference(format!(
            "Artifact returned {} predictions for {} rows",
            predictions.len(),
            samples.len()
        )));
    }

    samples
        .into_iter()
        .zip(predictions)
        .map(|(sample, class)| {
            Ok(ResultRow {
                id: sample.id,
                features: sample.features,
                predicted: QualityLabel::try_from(class)?,
                actual: sample.ground_truth.as_deref().map(GroundTruth::parse),
            })
        })
        .collect()
}

/// Frequency of each predicted label, most frequent first
///
/// Ties go to the better tier.
pub fn summarize(rows: &[ResultRow]) -> Vec<LabelCount> {
    let mut counts: HashMap<QualityLabel, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.predicted).or_default() += 1;
    }

    let mut summary: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect();
    summary.sort_by(|a, b| b.count.cmp(&a.count).then(b.label.cmp(&a.label)));
    summary
}

/// Share of rows whose recognizable ground truth equals the prediction
///
/// `None` when no row carries a recognizable ground truth.
pub fn agreement(rows: &[ResultRow]) -> Option<f64> {
    let (matched, total) = rows
        .iter()
        .filter_map(|row| row.actual.as_ref().and_then(GroundTruth::label).map(|l| l == row.predicted))
        .fold((0usize, 0usize), |(m, t), hit| (m + usize::from(hit), t + 1));

    (total > 0).then(|| matched as f64 / total as f64)
}
