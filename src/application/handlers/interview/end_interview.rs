//! EndInterviewHandler - Archives an ended interview and issues its
//! completion code.
//!
//! Exit after a successful archive returns the code already issued without
//! uploading again. A failed upload leaves the interview Ended and codeless,
//! so the participant can retry; the retry overwrites the object.
//!
//! Once the code is issued the interview is discarded from the store after
//! the retention window. Until then a repeated exit returns the same code.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{ErrorCode, InterviewId};
use crate::domain::interview::{pairs_to_flat, CompletionCode, InterviewError};
use crate::ports::{ArchiveError, InterviewStore, StoreError, TranscriptArchive};

use super::InterviewView;

#[derive(Debug, Error)]
pub enum EndInterviewError {
    #[error(transparent)]
    NotFound(#[from] StoreError),

    #[error(transparent)]
    Interview(#[from] InterviewError),

    #[error("failed to archive transcript: {0}")]
    Archive(#[from] ArchiveError),
}

impl EndInterviewError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EndInterviewError::NotFound(_) => ErrorCode::InterviewNotFound,
            EndInterviewError::Interview(err) => err.code(),
            EndInterviewError::Archive(_) => ErrorCode::ArchiveFailed,
        }
    }
}

/// Result of a successful exit.
#[derive(Debug, Clone)]
pub struct EndInterviewResult {
    pub completion_code: CompletionCode,
    pub completion_message: String,
    pub view: InterviewView,
}

/// How long an exited interview stays reachable by default.
pub const DEFAULT_EXIT_RETENTION: Duration = Duration::from_secs(300);

/// Handler for exiting an ended interview.
pub struct EndInterviewHandler {
    store: Arc<dyn InterviewStore>,
    archive: Arc<dyn TranscriptArchive>,
    code_prefix: String,
    retention: Duration,
}

impl EndInterviewHandler {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        archive: Arc<dyn TranscriptArchive>,
        code_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            archive,
            code_prefix: code_prefix.into(),
            retention: DEFAULT_EXIT_RETENTION,
        }
    }

    /// Sets how long an exited interview stays in the store.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub async fn handle(&self, id: InterviewId) -> Result<EndInterviewResult, EndInterviewError> {
        let shared = self.store.get(&id).await?;

        // 1. Snapshot the transcript, or return the code already issued
        let (session_id, messages) = {
            let interview = shared.lock().await;
            interview.ensure_can_exit()?;
            if let Some(code) = interview.completion_code() {
                return Ok(EndInterviewResult {
                    completion_code: code.clone(),
                    completion_message: code.message(),
                    view: InterviewView::from(&*interview),
                });
            }
            (
                interview.request().session_id.clone(),
                pairs_to_flat(interview.transcript().pairs()),
            )
        };

        // 2. Upload outside the lock
        if let Err(e) = self.archive.upload(&session_id, &messages).await {
            tracing::error!(
                interview_id = %id,
                session = %session_id,
                archive = self.archive.name(),
                error = %e,
                "Transcript upload failed"
            );
            return Err(e.into());
        }

        // 3. Issue the code; a concurrent exit may already have done so
        let mut interview = shared.lock().await;
        let first_exit = interview.completion_code().is_none();
        let code = interview
            .issue_completion_code(CompletionCode::generate(&self.code_prefix))?
            .clone();
        if first_exit {
            self.schedule_discard(id);
        }

        tracing::info!(
            interview_id = %id,
            session = %session_id,
            archive = self.archive.name(),
            messages = messages.len(),
            "Interview archived"
        );

        Ok(EndInterviewResult {
            completion_message: code.message(),
            completion_code: code,
            view: InterviewView::from(&*interview),
        })
    }
}

impl EndInterviewHandler {
    fn schedule_discard(&self, id: InterviewId) {
        let store = Arc::clone(&self.store);
        let retention = self.retention;
        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            if store.remove(&id).await.is_ok() {
                tracing::info!(interview_id = %id, "Exited interview discarded");
            }
        });
    }
}
