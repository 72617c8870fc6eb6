//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Handlers never hold an interview lock across a call to an external port.

pub mod handlers;

pub use handlers::{
    CreateInterviewCommand, CreateInterviewError, CreateInterviewHandler, EndInterviewError,
    EndInterviewHandler, EndInterviewResult, ExpireInterviewsHandler, GetInterviewHandler,
    InitializeSessionError, InitializeSessionHandler, InterviewView, SendMessageCommand,
    SendMessageError, SendMessageHandler, StartInterviewError, StartInterviewHandler,
    TurnFailure, TurnOutcome,
};
