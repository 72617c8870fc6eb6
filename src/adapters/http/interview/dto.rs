//! HTTP DTOs for interview endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::application::{EndInterviewResult, InterviewView};
use crate::domain::foundation::ErrorCode;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Inbound session parameters, as sent by the survey redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateInterviewQuery {
    pub user: Option<String>,
    pub session: Option<String>,
    pub questionid: Option<String>,
    pub response: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Response to a successful exit.
#[derive(Debug, Clone, Serialize)]
pub struct ExitResponse {
    pub completion_code: String,
    pub completion_message: String,
    pub view: InterviewView,
}

impl From<EndInterviewResult> for ExitResponse {
    fn from(result: EndInterviewResult) -> Self {
        Self {
            completion_code: result.completion_code.to_string(),
            completion_message: result.completion_message,
            view: result.view,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        status_for(self.code)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "Request failed");
        }
        (status, Json(ErrorResponse::new(self.code, self.message))).into_response()
    }
}

/// Maps an error code to its HTTP status.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::InvalidIdentifier => StatusCode::BAD_REQUEST,
        ErrorCode::UnknownQuestion | ErrorCode::ResponseOutOfRange => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ErrorCode::InterviewNotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidStateTransition
        | ErrorCode::TurnInProgress
        | ErrorCode::InterviewEnded => StatusCode::CONFLICT,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::AIProviderError | ErrorCode::ArchiveFailed => StatusCode::BAD_GATEWAY,
        ErrorCode::AssetUnavailable | ErrorCode::TemplateMismatch | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
