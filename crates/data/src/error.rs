//! Data handling error types.

use thiserror::Error;

/// Errors from loading and persisting sensor data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Missing column '{column}' in {file}")]
    MissingColumn { column: String, file: String },

    #[error("No model stored for sensor {0}")]
    ModelNotFound(String),
}

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;
