//! Pipeline error types.

use thiserror::Error;

/// Errors from running the detection and reconstruction pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Data error: {0}")]
    Data(#[from] data::DataError),

    #[error("Detection error: {0}")]
    Detect(#[from] anomaly::DetectError),

    #[error("Model error: {0}")]
    Model(#[from] recurrent::ModelError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
