//! Inference runner

use crate::features::{Feature, FeatureVector};
use crate::model::Classifier;
use crate::quality::PredictedClass;
use crate::{Error, Result};

/// Check that the artifact expects exactly the canonical feature order
pub fn check_feature_order(classifier: &dyn Classifier) -> Result<()> {
    let declared = classifier.feature_names();
    if declared.len() != Feature::ALL.len() {
        return Err(Error::Inference(format!(
            "Artifact expects {} features, input has {}",
            declared.len(),
            Feature::ALL.len()
        )));
    }
    for (position, (feature, name)) in Feature::ALL.iter().zip(declared).enumerate() {
        if feature.name() != name.as_str() {
            return Err(Error::Inference(format!(
                "Feature order mismatch at position {}: expected '{}', artifact has '{}'",
                position,
                feature.name(),
                name
            )));
        }
    }
    Ok(())
}

/// Predict one class per vector, in input order
pub fn run_inference(
    classifier: &dyn Classifier,
    batch: &[FeatureVector],
) -> Result<Vec<PredictedClass>> {
    check_feature_order(classifier)?;
    batch.iter().map(|features| classifier.predict(features)).collect()
}
