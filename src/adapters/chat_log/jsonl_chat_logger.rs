//! JSONL Chat Logger - Implementation of ChatLogger on the local filesystem.
//!
//! Each session gets its own file, `{log_dir}/{session}.jsonl`, holding one
//! JSON object per line:
//!
//! ```text
//! {"session":"abc","timestamp":"2024-04-07T10:30:05.000000Z","role":"user","message":"..."}
//! {"session":"abc","timestamp":"2024-04-07T10:30:07.120000Z","role":"bot","message":"..."}
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::foundation::SessionId;
use crate::ports::{ChatLogger, LogEntry, LogError};

/// Append-only JSON-lines logger.
#[derive(Debug)]
pub struct JsonlChatLogger {
    log_dir: PathBuf,
    /// Serializes appends so concurrent lines never interleave.
    write_lock: Mutex<()>,
}

impl JsonlChatLogger {
    /// Creates the log directory if missing and returns the logger.
    pub async fn init(log_dir: impl Into<PathBuf>) -> Result<Self, LogError> {
        let log_dir = log_dir.into();
        fs::create_dir_all(&log_dir).await.map_err(|e| LogError::Io {
            path: log_dir.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            log_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Returns the log file of a session.
    pub fn session_path(&self, session: &SessionId) -> PathBuf {
        self.log_dir.join(format!("{}.jsonl", session.as_str()))
    }
}

#[async_trait]
impl ChatLogger for JsonlChatLogger {
    async fn append(&self, entry: &LogEntry) -> Result<(), LogError> {
        let mut line =
            serde_json::to_string(entry).map_err(|e| LogError::Serialization(e.to_string()))?;
        line.push('\n');

        let path = self.session_path(&entry.session);
        let io_err = |e: std::io::Error| LogError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        tracing::debug!(
            session = %entry.session,
            role = ?entry.role,
            "Appended chat log entry"
        );
        Ok(())
    }
}
