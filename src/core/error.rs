//! Error types for kernel methods

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KMethodError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid labels: {0}")]
    InvalidLabels(String),

    #[error("Model not trained")]
    ModelNotTrained,

    #[error("Invalid regularization parameters: {0}")]
    SingularSystem(String),

    #[error("Empty training set")]
    EmptyDataset,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Undefined metric: {0}")]
    UndefinedMetric(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Config error: {0}")]
    ConfigError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KMethodError>;
