//! Completion codes shown to participants on exit.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_COMPLETION_CODE_PREFIX: &str = "cd-";

/// Display-only token proving the participant finished the interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionCode(String);

impl CompletionCode {
    /// Generates `prefix` followed by a fresh UUIDv4.
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{}{}", prefix, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Participant-facing message carrying the code.
    pub fn message(&self) -> String {
        format!(
            "Thank you for participating.\n\n\
             Your completion code is: {}\n\n\
             Please now return to the Qualtrics survey \
             and paste this code into the  completion code box.",
            self.0
        )
    }
}

impl fmt::Display for CompletionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
