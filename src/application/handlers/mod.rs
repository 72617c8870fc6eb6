//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod interview;

pub use interview::{
    // Commands
    CreateInterviewCommand, SendMessageCommand,
    // Handlers
    CreateInterviewHandler, EndInterviewHandler, ExpireInterviewsHandler, GetInterviewHandler,
    InitializeSessionHandler, SendMessageHandler, StartInterviewHandler,
    // Results
    EndInterviewResult, InterviewView, TurnFailure, TurnOutcome,
    // Errors
    CreateInterviewError, EndInterviewError, InitializeSessionError, SendMessageError,
    StartInterviewError,
};
