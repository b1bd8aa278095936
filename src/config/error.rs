//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Failed to render policy: {0}")]
    RenderFailed(#[from] serde_yaml::Error),

    #[error("Failed to write policy file: {0}")]
    WriteFailed(#[from] std::io::Error),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Lightface duration must be between 1 and 365 days, got {0}")]
    InvalidDuration(u32),

    #[error("Cycle phases must be lightface, optionally followed by darkface")]
    InvalidPhaseOrder,

    #[error("Unknown log format: {0}")]
    UnknownLogFormat(String),
}
