//! Completion provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::interview::{ModelArgs, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// Completion provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Wire flavor of the completion endpoint
    #[serde(default)]
    pub provider: AiProvider,

    /// Azure resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: Option<String>,

    /// OpenAI base URL override
    pub base_url: Option<String>,

    /// API key
    pub api_key: Option<Secret<String>>,

    /// Azure `api-version`
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Model (OpenAI) or deployment name (Azure)
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Completion provider flavor
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Azure,
    OpenAI,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Model arguments sent with every completion
    pub fn model_args(&self) -> ModelArgs {
        ModelArgs {
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("AI__API_KEY"));
        }

        match self.provider {
            AiProvider::Azure => {
                let endpoint = self
                    .endpoint
                    .as_deref()
                    .ok_or(ValidationError::MissingRequired("AI__ENDPOINT"))?;
                check_url("ai.endpoint", endpoint)?;
            }
            AiProvider::OpenAI => {
                if let Some(base_url) = &self.base_url {
                    check_url("ai.base_url", base_url)?;
                }
            }
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    match reqwest::Url::parse(value) {
        Ok(url) if url.scheme() == "https" || url.scheme() == "http" => Ok(()),
        _ => Err(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            endpoint: None,
            base_url: None,
            api_key: None,
            api_version: default_api_version(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_api_version() -> String {
    "2023-05-15".to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_timeout() -> u64 {
    120
}
