//! Feature validator
//!
//! All-or-nothing gate between the normalizer and inference: either every
//! row yields a [`Sample`] or the whole batch is rejected.

use crate::features::{Feature, FeatureVector, Sample, FEATURE_COUNT, ID_COLUMN, QUALITY_COLUMN};
use crate::schema::{RawTable, RawValue};
use crate::{Error, Result};

/// Canonical feature names absent from `headers`, in canonical order
pub fn missing_columns(headers: &[String]) -> Vec<String> {
    Feature::ALL
        .iter()
        .filter(|f| !headers.iter().any(|h| h == f.name()))
        .map(|f| f.name().to_string())
        .collect()
}

/// Turn a normalized table into validated samples
///
/// Column presence is checked once for the whole table and reported as a
/// single [`Error::MissingColumns`]; only then are cells inspected.
pub fn validate(table: &RawTable) -> Result<Vec<Sample>> {
    let missing = missing_columns(&table.headers);
    if !missing.is_empty() {
        return Err(Error::MissingColumns(missing));
    }

    let mut positions = [0usize; FEATURE_COUNT];
    for feature in Feature::ALL {
        // presence checked above
        positions[feature.index()] = table.column_index(feature.name()).unwrap_or_default();
    }
    let id_col = table.column_index(ID_COLUMN);
    let quality_col = table.column_index(QUALITY_COLUMN);

    table
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let row_number = index + 1;
            let mut values = [0.0; FEATURE_COUNT];
            for feature in Feature::ALL {
                let cell = row.get(positions[feature.index()]).unwrap_or(&RawValue::Null);
                values[feature.index()] = match cell {
                    RawValue::Number(n) => *n,
                    other => {
                        return Err(Error::ValueConversion {
                            row: row_number,
                            column: feature.name().to_string(),
                            value: other.to_string(),
                        })
                    }
                };
            }

            Ok(Sample {
                id: id_col.and_then(|c| row.get(c)).and_then(RawValue::as_text),
                features: FeatureVector::new(values, row_number)?,
                ground_truth: quality_col.and_then(|c| row.get(c)).and_then(RawValue::as_text),
            })
        })
        .collect()
}
