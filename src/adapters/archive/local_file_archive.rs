//! Local Directory Archive - Implementation of TranscriptArchive on the local
//! filesystem, used when no blob storage is configured.
//!
//! Writes `{dir}/{session}.jsonl` atomically: content goes to a `.tmp` file
//! which is synced and then renamed over the target, so a re-upload replaces
//! the previous transcript in one step.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::foundation::SessionId;
use crate::domain::interview::ChatMessage;
use crate::ports::{to_ndjson, ArchiveError, TranscriptArchive};

#[derive(Debug, Clone)]
pub struct LocalFileArchive {
    base_path: PathBuf,
}

impl LocalFileArchive {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the archive path of a session.
    pub fn session_path(&self, session: &SessionId) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", session.as_str()))
    }

    fn temp_path(&self, session: &SessionId) -> PathBuf {
        self.base_path.join(format!("{}.jsonl.tmp", session.as_str()))
    }
}

#[async_trait]
impl TranscriptArchive for LocalFileArchive {
    async fn upload(
        &self,
        session: &SessionId,
        messages: &[ChatMessage],
    ) -> Result<(), ArchiveError> {
        let body = to_ndjson(messages)?;

        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            ArchiveError::Io(format!(
                "Failed to create archive directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let temp_path = self.temp_path(session);
        let final_path = self.session_path(session);

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            ArchiveError::Io(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        file.write_all(body.as_bytes()).await.map_err(|e| {
            ArchiveError::Io(format!("Failed to write {}: {}", temp_path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            ArchiveError::Io(format!("Failed to sync {}: {}", temp_path.display(), e))
        })?;

        fs::rename(&temp_path, &final_path).await.map_err(|e| {
            ArchiveError::Io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            ))
        })?;

        tracing::info!(
            session = %session,
            path = %final_path.display(),
            records = messages.len(),
            "Archived transcript to local directory"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
