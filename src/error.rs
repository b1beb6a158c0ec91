//! Error types for the filter stages and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the pixel transforms.
///
/// Every error is a caller contract violation: the stages are pure, so
/// retrying with the same input gives the same error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("Parameter out of range: {name} = {value} ({reason})")]
    OutOfRangeParameter {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors produced while loading a pipeline configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Filter(#[from] FilterError),
}

pub type Result<T> = std::result::Result<T, FilterError>;
