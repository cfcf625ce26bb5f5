//! Error types for the training pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Every way a pipeline invocation can fail.
///
/// All variants are terminal: a run that returns one of these produced no
/// report at all.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unsupported algorithm: '{name}'. Supported algorithms: {}", .supported.join(", "))]
    UnsupportedAlgorithm { name: String, supported: Vec<String> },

    #[error("Unreadable input: {0}")]
    UnreadableInput(String),

    #[error(
        "Target column '{target}' not found in data. Provide exact column name. Available columns: {}",
        .available.join(", ")
    )]
    TargetNotFound { target: String, available: Vec<String> },

    #[error("Insufficient rows: need at least {required}, got {rows}")]
    InsufficientRows { rows: usize, required: usize },

    #[error("Feature shape mismatch: model expects {expected} features, got {actual}")]
    FeatureShapeMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PipelineError {
    /// Shorthand for building an [`PipelineError::InvalidParameter`]
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        PipelineError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::UnreadableInput(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Serialization(err.to_string())
    }
}
