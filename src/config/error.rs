//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("Turn limit must be at least 1")]
    InvalidTurnLimit,

    #[error("Invalid blob container name: {0}")]
    InvalidContainerName(String),

    #[error("Access password must not be empty")]
    EmptyAccessPassword,

    #[error("Local archive directory must differ from the chat log directory: {0}")]
    ArchiveDirConflict(String),

    #[error("Invalid interview retention: {0}")]
    InvalidRetention(&'static str),
}
