//! Route configuration for interview endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    create_interview, exit_interview, get_interview, start_interview, InterviewHandlers,
};
use super::ws_handler::interview_ws_handler;

/// Creates the interview router, to be nested under `/api/interviews`.
///
/// Routes:
/// - `POST /` - Create an interview (`?user=&session=&questionid=&response=`)
/// - `GET /:id` - Current interview view
/// - `POST /:id/start` - Initialize the session and show the opening question
/// - `GET /:id/stream` - WebSocket for participant turns
/// - `POST /:id/exit` - Archive the transcript and issue the completion code
pub fn interview_routes(handlers: InterviewHandlers) -> Router {
    Router::new()
        .route("/", post(create_interview))
        .route("/:id", get(get_interview))
        .route("/:id/start", post(start_interview))
        .route("/:id/stream", get(interview_ws_handler))
        .route("/:id/exit", post(exit_interview))
        .with_state(handlers)
}
