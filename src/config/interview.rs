//! Interview behavior configuration

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::interview::{
    EndCheck, DEFAULT_COMPLETION_CODE_PREFIX, DEFAULT_END_SENTINEL, DEFAULT_TURN_LIMIT,
};

pub const INITIAL_MESSAGE_FILE: &str = "initial_message.txt";
pub const SYSTEM_MESSAGE_FILE: &str = "system_message.txt";

/// Interview configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewConfig {
    /// Directory holding the question mapping, questions and prompt templates
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Transcript length (in turn pairs) that ends the interview
    #[serde(default = "default_turn_limit")]
    pub turn_limit: usize,

    /// Substring in a bot reply that ends the interview
    #[serde(default = "default_end_sentinel")]
    pub end_sentinel: String,

    /// Prefix of issued completion codes
    #[serde(default = "default_code_prefix")]
    pub completion_code_prefix: String,

    /// Seconds an exited interview stays reachable before it is discarded
    #[serde(default = "default_exit_retention")]
    pub exit_retention_secs: u64,

    /// Seconds after creation at which an unfinished interview is swept
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,

    /// Seconds between age sweeps
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl InterviewConfig {
    pub fn end_check(&self) -> EndCheck {
        EndCheck::new(self.turn_limit, self.end_sentinel.clone())
    }

    pub fn initial_message_path(&self) -> PathBuf {
        self.assets_dir.join(INITIAL_MESSAGE_FILE)
    }

    pub fn system_message_path(&self) -> PathBuf {
        self.assets_dir.join(SYSTEM_MESSAGE_FILE)
    }

    pub fn exit_retention(&self) -> Duration {
        Duration::from_secs(self.exit_retention_secs)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Validate interview configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.turn_limit == 0 {
            return Err(ValidationError::InvalidTurnLimit);
        }
        if self.max_age_secs == 0 {
            return Err(ValidationError::InvalidRetention("max_age_secs must be positive"));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidRetention(
                "sweep_interval_secs must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            turn_limit: default_turn_limit(),
            end_sentinel: default_end_sentinel(),
            completion_code_prefix: default_code_prefix(),
            exit_retention_secs: default_exit_retention(),
            max_age_secs: default_max_age(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("./assets")
}

fn default_turn_limit() -> usize {
    DEFAULT_TURN_LIMIT
}

fn default_end_sentinel() -> String {
    DEFAULT_END_SENTINEL.to_string()
}

fn default_code_prefix() -> String {
    DEFAULT_COMPLETION_CODE_PREFIX.to_string()
}

fn default_exit_retention() -> u64 {
    300
}

fn default_max_age() -> u64 {
    6 * 60 * 60
}

fn default_sweep_interval() -> u64 {
    60
}
