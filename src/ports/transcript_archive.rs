//! Transcript Archive Port - Durable storage of finished transcripts.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::SessionId;
use crate::domain::interview::ChatMessage;

/// Errors raised while archiving a transcript.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("invalid archive configuration: {0}")]
    Configuration(String),

    #[error("failed to serialize transcript: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("archive rejected upload with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Port for uploading a flattened transcript.
///
/// # Contract
///
/// - one object per session, named after the session id
/// - uploading again overwrites the previous object
#[async_trait]
pub trait TranscriptArchive: Send + Sync {
    /// Uploads the transcript of `session`.
    async fn upload(&self, session: &SessionId, messages: &[ChatMessage])
        -> Result<(), ArchiveError>;

    /// Short adapter name for logging.
    fn name(&self) -> &'static str;
}

/// Serializes messages as newline-delimited JSON `{role, content}` records.
pub fn to_ndjson(messages: &[ChatMessage]) -> Result<String, ArchiveError> {
    let lines = messages
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ArchiveError::Serialization(e.to_string()))?;
    Ok(lines.join("\n"))
}
