//! Interview-specific error types.

use super::InterviewStatus;
use crate::domain::foundation::ErrorCode;
use thiserror::Error;

/// Errors raised by the interview aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterviewError {
    #[error("cannot {action} while interview is {status}")]
    InvalidState {
        action: &'static str,
        status: InterviewStatus,
    },

    #[error("a turn is already in progress")]
    TurnInProgress,

    #[error("no turn is in progress")]
    NoPendingTurn,

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("message exceeds {max} characters")]
    MessageTooLong { max: usize },

    #[error("completion returned no content")]
    EmptyCompletion,
}

impl InterviewError {
    pub fn invalid_state(action: &'static str, status: InterviewStatus) -> Self {
        InterviewError::InvalidState { action, status }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            InterviewError::InvalidState {
                status: InterviewStatus::Ended,
                ..
            } => ErrorCode::InterviewEnded,
            InterviewError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            InterviewError::TurnInProgress => ErrorCode::TurnInProgress,
            InterviewError::NoPendingTurn => ErrorCode::InvalidStateTransition,
            InterviewError::EmptyMessage | InterviewError::MessageTooLong { .. } => {
                ErrorCode::ValidationFailed
            }
            InterviewError::EmptyCompletion => ErrorCode::AIProviderError,
        }
    }
}
