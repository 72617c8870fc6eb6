//! HTTP adapter for interview endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod streaming;
pub mod ws_handler;

pub use dto::{ApiError, CreateInterviewQuery, ErrorResponse, ExitResponse, HealthResponse};
pub use handlers::InterviewHandlers;
pub use routes::interview_routes;
pub use streaming::{StreamClientMessage, StreamServerMessage};
pub use ws_handler::interview_ws_handler;
