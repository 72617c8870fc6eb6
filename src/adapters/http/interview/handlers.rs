//! HTTP handlers for interview endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{
    CreateInterviewCommand, CreateInterviewError, CreateInterviewHandler, EndInterviewError,
    EndInterviewHandler, GetInterviewHandler, SendMessageError, SendMessageHandler,
    StartInterviewError, StartInterviewHandler,
};
use crate::domain::foundation::{ErrorCode, InterviewId};
use crate::ports::StoreError;

use super::dto::{ApiError, CreateInterviewQuery, ExitResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct InterviewHandlers {
    pub(super) create_handler: Arc<CreateInterviewHandler>,
    pub(super) start_handler: Arc<StartInterviewHandler>,
    pub(super) get_handler: Arc<GetInterviewHandler>,
    pub(super) send_handler: Arc<SendMessageHandler>,
    pub(super) end_handler: Arc<EndInterviewHandler>,
}

impl InterviewHandlers {
    pub fn new(
        create_handler: Arc<CreateInterviewHandler>,
        start_handler: Arc<StartInterviewHandler>,
        get_handler: Arc<GetInterviewHandler>,
        send_handler: Arc<SendMessageHandler>,
        end_handler: Arc<EndInterviewHandler>,
    ) -> Self {
        Self {
            create_handler,
            start_handler,
            get_handler,
            send_handler,
            end_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/interviews - Create an interview from the survey parameters
pub async fn create_interview(
    State(handlers): State<InterviewHandlers>,
    Query(query): Query<CreateInterviewQuery>,
) -> Response {
    let cmd = CreateInterviewCommand {
        user: query.user,
        session: query.session,
        question_id: query.questionid,
        response: query.response,
    };

    match handlers.create_handler.handle(cmd).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST /api/interviews/:id/start - Initialize the session and go Active
pub async fn start_interview(
    State(handlers): State<InterviewHandlers>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_interview_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match handlers.start_handler.handle(id).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// GET /api/interviews/:id - Current interview view
pub async fn get_interview(
    State(handlers): State<InterviewHandlers>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_interview_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match handlers.get_handler.handle(id).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// POST /api/interviews/:id/exit - Archive the transcript and issue the code
pub async fn exit_interview(
    State(handlers): State<InterviewHandlers>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_interview_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match handlers.end_handler.handle(id).await {
        Ok(result) => (StatusCode::OK, Json(ExitResponse::from(result))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub(super) fn parse_interview_id(raw: &str) -> Result<InterviewId, ApiError> {
    raw.parse::<InterviewId>()
        .map_err(|_| ApiError::new(ErrorCode::InvalidIdentifier, "Invalid interview ID"))
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

impl From<CreateInterviewError> for ApiError {
    fn from(e: CreateInterviewError) -> Self {
        ApiError::new(e.code(), e.to_string())
    }
}

impl From<StartInterviewError> for ApiError {
    fn from(e: StartInterviewError) -> Self {
        ApiError::new(e.code(), e.to_string())
    }
}

impl From<SendMessageError> for ApiError {
    fn from(e: SendMessageError) -> Self {
        ApiError::new(e.code(), e.to_string())
    }
}

impl From<EndInterviewError> for ApiError {
    fn from(e: EndInterviewError) -> Self {
        ApiError::new(e.code(), e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let code = match e {
            StoreError::NotFound(_) => ErrorCode::InterviewNotFound,
            StoreError::AlreadyExists(_) => ErrorCode::InternalError,
        };
        ApiError::new(code, e.to_string())
    }
}
