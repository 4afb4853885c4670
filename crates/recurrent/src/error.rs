//! Model error types.

use thiserror::Error;

/// Sequence model errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Insufficient history: need at least {required} points, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
