//! Interview handlers.
//!
//! Command handlers:
//! - `CreateInterviewHandler` - opens a NotStarted interview
//! - `StartInterviewHandler` - initializes the session and goes Active
//! - `SendMessageHandler` - runs one streamed participant turn
//! - `EndInterviewHandler` - archives the transcript and issues the code
//! - `ExpireInterviewsHandler` - sweeps interviews past their maximum age
//!
//! Query handlers:
//! - `GetInterviewHandler` - current interview view

mod create_interview;
mod end_interview;
mod expire_interviews;
mod get_interview;
mod initialize_session;
mod send_message;
mod start_interview;
mod view;

pub use create_interview::{CreateInterviewCommand, CreateInterviewError, CreateInterviewHandler};
pub use end_interview::{
    EndInterviewError, EndInterviewHandler, EndInterviewResult, DEFAULT_EXIT_RETENTION,
};
pub use expire_interviews::ExpireInterviewsHandler;
pub use get_interview::GetInterviewHandler;
pub use initialize_session::{
    InitializeSessionError, InitializeSessionHandler, RESPONSE_VAL_VAR, SURVEY_QUESTION_VAR,
};
pub use send_message::{
    SendMessageCommand, SendMessageError, SendMessageHandler, TurnFailure, TurnOutcome,
};
pub use start_interview::{StartInterviewError, StartInterviewHandler};
pub use view::InterviewView;
