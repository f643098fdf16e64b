//! Quality label mapper
//!
//! Classifiers emit an ordinal class; the dashboard shows one of six tiers.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::{Error, Result};

/// Raw classifier output
///
/// Deliberately wider than the label domain so an artifact emitting an
/// unexpected class is caught by [`QualityLabel::try_from`] instead of
/// being truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PredictedClass(pub i64);

/// Human-readable quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QualityLabel {
    Defective = 0,
    Regular = 1,
    Good = 2,
    VeryGood = 3,
    Excellent = 4,
    Exceptional = 5,
}

impl QualityLabel {
    /// All tiers from best to worst
    pub const ALL: [QualityLabel; 6] = [
        QualityLabel::Exceptional,
        QualityLabel::Excellent,
        QualityLabel::VeryGood,
        QualityLabel::Good,
        QualityLabel::Regular,
        QualityLabel::Defective,
    ];

    /// Display string
    pub fn label(self) -> &'static str {
        match self {
            QualityLabel::Exceptional => "Excepcional",
            QualityLabel::Excellent => "Excelente",
            QualityLabel::VeryGood => "Muy Bueno",
            QualityLabel::Good => "Bueno",
            QualityLabel::Regular => "Regular",
            QualityLabel::Defective => "Vino defectuoso",
        }
    }

    /// Ordinal class this tier is encoded as
    pub fn class(self) -> PredictedClass {
        PredictedClass(self as i64)
    }

    /// Look up a tier by its display string (exact, then case-insensitive)
    pub fn from_label(text: &str) -> Option<QualityLabel> {
        let text = text.trim();
        QualityLabel::ALL
            .iter()
            .copied()
            .find(|q| q.label() == text)
            .or_else(|| {
                QualityLabel::ALL
                    .iter()
                    .copied()
                    .find(|q| q.label().eq_ignore_ascii_case(text))
            })
    }
}

impl TryFrom<PredictedClass> for QualityLabel {
    type Error = Error;

    fn try_from(class: PredictedClass) -> Result<Self> {
        match class.0 {
            0 => Ok(QualityLabel::Defective),
            1 => Ok(QualityLabel::Regular),
            2 => Ok(QualityLabel::Good),
            3 => Ok(QualityLabel::VeryGood),
            4 => Ok(QualityLabel::Excellent),
            5 => Ok(QualityLabel::Exceptional),
            other => Err(Error::UnknownClass(other)),
        }
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for QualityLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Ground-truth quality as supplied with the input
///
/// Databases store the tier name, hand-made files sometimes the ordinal;
/// anything else is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroundTruth {
    Known(QualityLabel),
    Unrecognized(String),
}

impl GroundTruth {
    pub fn parse(raw: &str) -> GroundTruth {
        if let Some(label) = QualityLabel::from_label(raw) {
            return GroundTruth::Known(label);
        }
        raw.trim()
            .parse::<i64>()
            .ok()
            .and_then(|n| QualityLabel::try_from(PredictedClass(n)).ok())
            .map(GroundTruth::Known)
            .unwrap_or_else(|| GroundTruth::Unrecognized(raw.to_string()))
    }

    pub fn label(&self) -> Option<QualityLabel> {
        match self {
            GroundTruth::Known(label) => Some(*label),
            GroundTruth::Unrecognized(_) => None,
        }
    }
}

impl fmt::Display for GroundTruth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroundTruth::Known(label) => f.write_str(label.label()),
            GroundTruth::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for GroundTruth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapping_is_total_on_domain() {
        for class in 0..=5 {
            let label = QualityLabel::try_from(PredictedClass(class)).unwrap();
            assert_eq!(label.class(), PredictedClass(class));
        }
        assert_eq!(
            QualityLabel::try_from(PredictedClass(5)).unwrap().label(),
            "Excepcional"
        );
        assert_eq!(
            QualityLabel::try_from(PredictedClass(0)).unwrap().label(),
            "Vino defectuoso"
        );
    }

    #[test]
    fn test_out_of_domain_is_not_defaulted() {
        for class in [-1, 6, 7, 100] {
            assert!(matches!(
                QualityLabel::try_from(PredictedClass(class)),
                Err(Error::UnknownClass(c)) if c == class
            ));
        }
    }

    #[test]
    fn test_ground_truth_parse() {
        assert_eq!(
            GroundTruth::parse("Muy Bueno"),
            GroundTruth::Known(QualityLabel::VeryGood)
        );
        assert_eq!(
            GroundTruth::parse("excelente"),
            GroundTruth::Known(QualityLabel::Excellent)
        );
        assert_eq!(GroundTruth::parse("2"), GroundTruth::Known(QualityLabel::Good));
        assert_eq!(
            GroundTruth::parse("9"),
            GroundTruth::Unrecognized("9".to_string())
        );
    }

    #[test]
    fn test_label_serializes_as_display_string() {
        let json = serde_json::to_value(QualityLabel::VeryGood).unwrap();
        assert_eq!(json, "Muy Bueno");
    }
}
