//! Common error types for the wine-quality pipeline

use thiserror::Error;

/// Common result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the dashboard and the loader
#[derive(Error, Debug)]
pub enum Error {
    /// Database connection info is missing or unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input table is structurally malformed (header, duplicates, ragged rows)
    #[error("Schema error: {0}")]
    Schema(String),

    /// One or more canonical feature columns are absent
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A cell could not be turned into a finite number
    #[error("Invalid value {value:?} in column '{column}' at row {row}")]
    ValueConversion {
        row: usize,
        column: String,
        value: String,
    },

    /// Unknown model identifier, or its artifact is missing or corrupt
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// The artifact rejected the batch
    #[error("Inference error: {0}")]
    Inference(String),

    /// The artifact produced a class outside the known label domain
    #[error("Unknown predicted class: {0}")]
    UnknownClass(i64),

    /// Query or connection failure (wraps sqlx::Error)
    #[error("Data source error: {0}")]
    DataSource(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
