//! Raw tabular input and the schema normalizer
//!
//! Uploaded files arrive with whatever headers and decimal convention the
//! author used. [`normalize`] maps them onto the canonical schema and turns
//! every present feature column into numbers; it never decides whether the
//! table is complete, that is the validator's job.

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use crate::features::Feature;
use crate::{Error, Result};

/// Default field delimiter of uploaded files
pub const DEFAULT_DELIMITER: u8 = b';';

/// Name given to a column whose header is blank, followed by its 1-based position
pub const UNNAMED_PREFIX: &str = "unnamed_";

/// Known alternate spellings (human-readable dataset headers)
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("fixed acidity", "fixed_acidity"),
    ("volatile acidity", "volatile_acidity"),
    ("citric acid", "citric_acid"),
    ("residual sugar", "residual_sugar"),
    ("free sulfur dioxide", "free_sulfur_dioxide"),
    ("total sulfur dioxide", "total_sulfur_dioxide"),
    ("pH", "ph"),
];

/// One cell of raw input
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Null,
}

impl RawValue {
    /// Text form used for passthrough columns and error reports
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Number(n) => Some(n.to_string()),
            RawValue::Null => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => f.write_str(s),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Null => Ok(()),
        }
    }
}

/// Decimal separator convention of numeric text cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalStyle {
    /// `7,4` means 7.4
    #[default]
    Comma,
    /// `7.4` only
    Point,
}

impl FromStr for DecimalStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comma" => Ok(DecimalStyle::Comma),
            "point" | "dot" => Ok(DecimalStyle::Point),
            other => Err(Error::Schema(format!(
                "Unknown decimal style '{}' (expected 'comma' or 'point')",
                other
            ))),
        }
    }
}

/// A set of raw records sharing one header row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<RawValue>>) -> Self {
        Self { headers, rows }
    }

    /// Parse delimited text with a header row
    ///
    /// Empty cells become [`RawValue::Null`]; everything else stays text.
    /// Ragged rows are accepted here and rejected by [`normalize`].
    pub fn from_csv_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::Schema(format!("Unreadable header row: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| Error::Schema(format!("Unreadable record: {}", e)))?;
            rows.push(
                record
                    .iter()
                    .map(|cell| {
                        if cell.trim().is_empty() {
                            RawValue::Null
                        } else {
                            RawValue::Text(cell.to_string())
                        }
                    })
                    .collect(),
            );
        }

        Ok(Self { headers, rows })
    }

    pub fn from_csv_str(text: &str, delimiter: u8) -> Result<Self> {
        Self::from_csv_reader(text.as_bytes(), delimiter)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Map one header onto its canonical spelling
///
/// Known aliases first, otherwise lower-case with whitespace runs turned
/// into underscores. Canonical names map to themselves.
pub fn normalize_header(header: &str) -> String {
    let trimmed = header.trim_start_matches('\u{feff}').trim();
    if let Some((_, canonical)) = HEADER_ALIASES.iter().find(|(alias, _)| *alias == trimmed) {
        return canonical.to_string();
    }
    trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Rename headers and coerce every present feature column to numbers
///
/// Row numbers in errors are 1-based data rows (the header is not counted).
pub fn normalize(table: &RawTable, decimal: DecimalStyle) -> Result<RawTable> {
    if table.headers.is_empty() {
        return Err(Error::Schema("Input has no header row".to_string()));
    }

    // blank names (trailing delimiters) become ignorable passthrough columns
    let headers: Vec<String> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| match normalize_header(h) {
            name if name.is_empty() => format!("{}{}", UNNAMED_PREFIX, i + 1),
            name => name,
        })
        .collect();

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(Error::Schema(format!(
                "Duplicate column '{}' after renaming",
                header
            )));
        }
    }

    let feature_columns: Vec<(usize, Feature)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| Feature::from_column(h).map(|f| (i, f)))
        .collect();

    let mut rows = Vec::with_capacity(table.rows.len());
    for (index, row) in table.rows.iter().enumerate() {
        let row_number = index + 1;
        if row.len() != headers.len() {
            return Err(Error::Schema(format!(
                "Row {} has {} fields but the header has {}",
                row_number,
                row.len(),
                headers.len()
            )));
        }

        let mut normalized = row.clone();
        for &(col, feature) in &feature_columns {
            let value = coerce(&row[col], decimal).ok_or_else(|| Error::ValueConversion {
                row: row_number,
                column: feature.name().to_string(),
                value: row[col].to_string(),
            })?;
            normalized[col] = RawValue::Number(value);
        }
        rows.push(normalized);
    }

    Ok(RawTable { headers, rows })
}

fn coerce(value: &RawValue, decimal: DecimalStyle) -> Option<f64> {
    match value {
        RawValue::Number(n) => Some(*n),
        RawValue::Null => None,
        RawValue::Text(text) => {
            let text = text.trim();
            match decimal {
                DecimalStyle::Comma => text.replace(',', ".").parse().ok(),
                DecimalStyle::Point => text.parse().ok(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    #[test]
    fn test_normalize_header_aliases() {
        assert_eq!(normalize_header("fixed acidity"), "fixed_acidity");
        assert_eq!(normalize_header("pH"), "ph");
        assert_eq!(normalize_header("  Total   Sulfur Dioxide "), "total_sulfur_dioxide");
        assert_eq!(normalize_header("\u{feff}id"), "id");
        assert_eq!(normalize_header("alcohol"), "alcohol");
    }

    #[test]
    fn test_comma_decimal_coercion() {
        let table = RawTable::new(
            vec!["density".into(), "pH".into()],
            vec![vec![text("0,9978"), text("3,51")]],
        );
        let out = normalize(&table, DecimalStyle::Comma).unwrap();
        assert_eq!(out.headers, vec!["density", "ph"]);
        assert_eq!(out.rows[0], vec![RawValue::Number(0.9978), RawValue::Number(3.51)]);
    }

    #[test]
    fn test_point_style_rejects_comma() {
        let table = RawTable::new(vec!["alcohol".into()], vec![vec![text("9,4")]]);
        let err = normalize(&table, DecimalStyle::Point).unwrap_err();
        assert!(matches!(err, Error::ValueConversion { row: 1, .. }));
    }

    #[test]
    fn test_passthrough_columns_untouched() {
        let table = RawTable::new(
            vec!["id".into(), "quality".into(), "alcohol".into()],
            vec![vec![text("42"), text("Bueno"), text("10")]],
        );
        let out = normalize(&table, DecimalStyle::Comma).unwrap();
        assert_eq!(out.rows[0][0], text("42"));
        assert_eq!(out.rows[0][1], text("Bueno"));
        assert_eq!(out.rows[0][2], RawValue::Number(10.0));
    }

    #[test]
    fn test_empty_feature_cell_is_conversion_error() {
        let table = RawTable::new(vec!["chlorides".into()], vec![vec![RawValue::Null]]);
        let err = normalize(&table, DecimalStyle::Comma).unwrap_err();
        match err {
            Error::ValueConversion { column, .. } => assert_eq!(column, "chlorides"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_after_renaming() {
        let table = RawTable::new(vec!["pH".into(), "ph".into()], vec![]);
        assert!(matches!(
            normalize(&table, DecimalStyle::Comma),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_trailing_delimiter_column_ignored() {
        let table = RawTable::from_csv_str("id;alcohol;\n1;9,4;\n2;10,1;\n", b';').unwrap();
        let out = normalize(&table, DecimalStyle::Comma).unwrap();
        assert_eq!(out.headers, vec!["id", "alcohol", "unnamed_3"]);
        assert_eq!(out.rows[1][1], RawValue::Number(10.1));
        assert_eq!(out.rows[1][2], RawValue::Null);
        assert_eq!(normalize(&out, DecimalStyle::Comma).unwrap(), out);
    }

    #[test]
    fn test_blank_headers_do_not_collide() {
        let table = RawTable::new(vec!["alcohol".into(), " ".into(), "".into()], vec![]);
        let out = normalize(&table, DecimalStyle::Comma).unwrap();
        assert_eq!(out.headers, vec!["alcohol", "unnamed_2", "unnamed_3"]);
    }

    #[test]
    fn test_ragged_row_rejected() {
        let table = RawTable::from_csv_str("alcohol;density\n9,4\n", b';').unwrap();
        assert!(matches!(
            normalize(&table, DecimalStyle::Comma),
            Err(Error::Schema(_))
        ));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let table = RawTable::from_csv_str(
            "id;fixed acidity;pH;quality;notes\n1;7,4;3,51;Bueno;first pick\n",
            b';',
        )
        .unwrap();
        let once = normalize(&table, DecimalStyle::Comma).unwrap();
        let twice = normalize(&once, DecimalStyle::Comma).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_decimal_style_from_str() {
        assert_eq!("comma".parse::<DecimalStyle>().unwrap(), DecimalStyle::Comma);
        assert_eq!("Point".parse::<DecimalStyle>().unwrap(), DecimalStyle::Point);
        assert!("semicolon".parse::<DecimalStyle>().is_err());
    }
}
