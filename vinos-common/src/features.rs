//! Canonical feature schema
//!
//! The 11 physicochemical measurements every classifier consumes, in the
//! fixed order the artifacts were trained on.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Index;

use crate::{Error, Result};

/// Number of canonical features
pub const FEATURE_COUNT: usize = 11;

/// Canonical column carrying the row identifier
pub const ID_COLUMN: &str = "id";

/// Canonical column carrying the ground-truth quality
pub const QUALITY_COLUMN: &str = "quality";

/// One canonical feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    FixedAcidity,
    VolatileAcidity,
    CitricAcid,
    ResidualSugar,
    Chlorides,
    FreeSulfurDioxide,
    TotalSulfurDioxide,
    Density,
    Ph,
    Sulphates,
    Alcohol,
}

impl Feature {
    /// All features in canonical order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::FixedAcidity,
        Feature::VolatileAcidity,
        Feature::CitricAcid,
        Feature::ResidualSugar,
        Feature::Chlorides,
        Feature::FreeSulfurDioxide,
        Feature::TotalSulfurDioxide,
        Feature::Density,
        Feature::Ph,
        Feature::Sulphates,
        Feature::Alcohol,
    ];

    /// Canonical snake-case column name
    pub fn name(self) -> &'static str {
        match self {
            Feature::FixedAcidity => "fixed_acidity",
            Feature::VolatileAcidity => "volatile_acidity",
            Feature::CitricAcid => "citric_acid",
            Feature::ResidualSugar => "residual_sugar",
            Feature::Chlorides => "chlorides",
            Feature::FreeSulfurDioxide => "free_sulfur_dioxide",
            Feature::TotalSulfurDioxide => "total_sulfur_dioxide",
            Feature::Density => "density",
            Feature::Ph => "ph",
            Feature::Sulphates => "sulphates",
            Feature::Alcohol => "alcohol",
        }
    }

    /// Position in the canonical order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a feature by its canonical column name
    ///
    /// Only canonical names match; alternate spellings are the normalizer's job.
    pub fn from_column(name: &str) -> Option<Feature> {
        Feature::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Canonical column names in order
    pub fn names() -> [&'static str; FEATURE_COUNT] {
        Feature::ALL.map(Feature::name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-order vector of the 11 canonical features
///
/// Every value is finite; the only way in is [`FeatureVector::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector, rejecting NaN and infinities
    ///
    /// `row` is only used for the error report.
    pub fn new(values: [f64; FEATURE_COUNT], row: usize) -> Result<Self> {
        if let Some(feature) = Feature::ALL.iter().find(|f| !values[f.index()].is_finite()) {
            return Err(Error::ValueConversion {
                row,
                column: feature.name().to_string(),
                value: values[feature.index()].to_string(),
            });
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f64;

    fn index(&self, feature: Feature) -> &f64 {
        &self.0[feature.index()]
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for feature in Feature::ALL {
            map.serialize_entry(feature.name(), &self[feature])?;
        }
        map.end()
    }
}

/// One validated input row
///
/// The id and ground truth travel with their features; they are never
/// handed to a classifier and never re-attached by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: Option<String>,
    pub features: FeatureVector,
    pub ground_truth: Option<String>,
}
