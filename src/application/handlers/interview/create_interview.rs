//! CreateInterviewHandler - Opens a NotStarted interview for a participant.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::foundation::{ErrorCode, InterviewId, ValidationError};
use crate::domain::interview::{Interview, SessionRequest};
use crate::ports::{InterviewStore, StoreError};

use super::InterviewView;

/// Command carrying the raw inbound query parameters.
#[derive(Debug, Clone, Default)]
pub struct CreateInterviewCommand {
    pub user: Option<String>,
    pub session: Option<String>,
    pub question_id: Option<String>,
    pub response: Option<String>,
}

#[derive(Debug, Error)]
pub enum CreateInterviewError {
    #[error("invalid session parameters: {0}")]
    InvalidParameters(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CreateInterviewError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CreateInterviewError::InvalidParameters(_) => ErrorCode::InvalidIdentifier,
            CreateInterviewError::Store(_) => ErrorCode::InternalError,
        }
    }
}

/// Handler for creating interviews.
pub struct CreateInterviewHandler {
    store: Arc<dyn InterviewStore>,
}

impl CreateInterviewHandler {
    pub fn new(store: Arc<dyn InterviewStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        cmd: CreateInterviewCommand,
    ) -> Result<InterviewView, CreateInterviewError> {
        let request =
            SessionRequest::from_params(cmd.user, cmd.session, cmd.question_id, cmd.response)?;
        let interview = Interview::new(InterviewId::new(), request);
        let view = InterviewView::from(&interview);

        self.store.insert(interview).await?;

        tracing::info!(
            interview_id = %view.interview_id,
            "Interview created"
        );
        Ok(view)
    }
}
