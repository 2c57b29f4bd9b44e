//! Unified error types for gemgate Core.

use gemgate_types::ConfigError;
use thiserror::Error;

/// Error type for start-up operations (data directory, configuration).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unclassified error with message.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias for gemgate operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Unknown(s)
    }
}
