//! Session request parameters and the initialized session they produce.

use crate::domain::foundation::{SessionId, UserId, ValidationError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_USER: &str = "testUser";
pub const DEFAULT_SESSION: &str = "testSession";
pub const DEFAULT_QUESTION_ID: &str = "0";
pub const DEFAULT_RESPONSE: &str = "0";

pub const DEFAULT_MODEL: &str = "gpt-4o-default";
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Inbound session parameters, defaults applied and identifiers validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub question_id: String,
    pub response: String,
}

impl SessionRequest {
    /// Builds a request from optional query parameters.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` when `user` or `session` is not a safe
    /// identifier.
    pub fn from_params(
        user: Option<String>,
        session: Option<String>,
        question_id: Option<String>,
        response: Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            user_id: UserId::new(user.unwrap_or_else(|| DEFAULT_USER.to_string()))?,
            session_id: SessionId::new(session.unwrap_or_else(|| DEFAULT_SESSION.to_string()))?,
            question_id: question_id.unwrap_or_else(|| DEFAULT_QUESTION_ID.to_string()),
            response: response.unwrap_or_else(|| DEFAULT_RESPONSE.to_string()),
        })
    }
}

/// Model configuration sent with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArgs {
    pub model: String,
    pub temperature: f32,
}

impl Default for ModelArgs {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Per-interview session fields, fixed once initialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub question_wording: String,
    pub response_text: String,
    pub initial_message: String,
    pub system_message: String,
    pub model_args: ModelArgs,
}
