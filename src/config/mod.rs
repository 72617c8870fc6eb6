//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SURVEY_DEBRIEF` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use survey_debrief::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod error;
mod interview;
mod server;
mod storage;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use interview::{InterviewConfig, INITIAL_MESSAGE_FILE, SYSTEM_MESSAGE_FILE};
pub use server::{Environment, ServerConfig};
pub use storage::StorageConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, access control)
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion provider configuration (Azure OpenAI/OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Chat log and transcript archive configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Assets and end-of-interview settings
    #[serde(default)]
    pub interview: InterviewConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SURVEY_DEBRIEF` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SURVEY_DEBRIEF__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SURVEY_DEBRIEF__AI__API_KEY=...` -> `ai.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SURVEY_DEBRIEF")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.storage.validate()?;
        self.interview.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
