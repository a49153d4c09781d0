//! Error types for the runner.

use sideband_codec::CodecError;
use thiserror::Error;

/// Errors that can occur while loading configuration or running commands.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
