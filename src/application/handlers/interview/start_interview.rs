//! StartInterviewHandler - Moves an interview from NotStarted to Active.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::foundation::{ErrorCode, InterviewId, StateMachine};
use crate::domain::interview::{InterviewError, InterviewStatus};
use crate::ports::{InterviewStore, StoreError};

use super::{InitializeSessionError, InitializeSessionHandler, InterviewView};

#[derive(Debug, Error)]
pub enum StartInterviewError {
    #[error(transparent)]
    NotFound(#[from] StoreError),

    #[error(transparent)]
    Interview(#[from] InterviewError),

    #[error("session initialization failed: {0}")]
    Initialization(#[from] InitializeSessionError),
}

impl StartInterviewError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StartInterviewError::NotFound(_) => ErrorCode::InterviewNotFound,
            StartInterviewError::Interview(err) => err.code(),
            StartInterviewError::Initialization(err) => err.code(),
        }
    }
}

/// Handler for starting interviews.
pub struct StartInterviewHandler {
    store: Arc<dyn InterviewStore>,
    initializer: Arc<InitializeSessionHandler>,
}

impl StartInterviewHandler {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        initializer: Arc<InitializeSessionHandler>,
    ) -> Self {
        Self { store, initializer }
    }

    pub async fn handle(&self, id: InterviewId) -> Result<InterviewView, StartInterviewError> {
        let shared = self.store.get(&id).await?;
        // Held across initialization so concurrent starts cannot both succeed.
        // Initialization only reads local assets.
        let mut interview = shared.lock().await;

        if !interview.status().can_transition_to(&InterviewStatus::Active) {
            return Err(InterviewError::invalid_state("start", interview.status()).into());
        }

        let session = self.initializer.handle(interview.request()).await?;
        interview.start(session)?;

        tracing::info!(interview_id = %id, "Interview started");
        Ok(InterviewView::from(&*interview))
    }
}
