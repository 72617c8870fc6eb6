//! Chat Logger Port - Append-only per-session turn log.
//!
//! Every completed turn produces two entries, user first then bot. Entries are
//! never rewritten or deleted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{SessionId, Timestamp};

/// Who produced a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRole {
    User,
    Bot,
}

/// One logged turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub session: SessionId,
    /// ISO-8601 UTC timestamp.
    pub timestamp: String,
    pub role: LogRole,
    pub message: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current time.
    pub fn now(session: SessionId, role: LogRole, message: impl Into<String>) -> Self {
        Self::at(session, Timestamp::now(), role, message)
    }

    pub fn at(
        session: SessionId,
        timestamp: Timestamp,
        role: LogRole,
        message: impl Into<String>,
    ) -> Self {
        Self {
            session,
            timestamp: timestamp.to_iso8601(),
            role,
            message: message.into(),
        }
    }
}

/// Errors raised while appending to the log.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to write log {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to serialize log entry: {0}")]
    Serialization(String),
}

/// Port for the per-session append-only log.
///
/// # Contract
///
/// - `append` completes only once the entry is durable in its target
/// - entries of one session keep their append order
#[async_trait]
pub trait ChatLogger: Send + Sync {
    /// Appends one entry to its session's log.
    async fn append(&self, entry: &LogEntry) -> Result<(), LogError>;
}
