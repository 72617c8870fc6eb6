//! Interview domain module.
//!
//! The interview aggregate, its transcript, the conversion between paired
//! turns and flat completion messages, and end-of-interview detection.

mod aggregate;
mod completion;
mod end_check;
mod errors;
mod format;
mod session;
mod status;
mod transcript;

pub use aggregate::{CompletedTurn, Controls, Interview, TurnRequest, MAX_MESSAGE_LENGTH};
pub use completion::{CompletionCode, DEFAULT_COMPLETION_CODE_PREFIX};
pub use end_check::{EndCheck, EndOutcome, EndReason, DEFAULT_END_SENTINEL, DEFAULT_TURN_LIMIT};
pub use errors::InterviewError;
pub use format::{flat_to_pairs, pairs_to_flat, ChatMessage, Role};
pub use session::{
    InterviewSession, ModelArgs, SessionRequest, DEFAULT_MODEL, DEFAULT_QUESTION_ID,
    DEFAULT_RESPONSE, DEFAULT_SESSION, DEFAULT_TEMPERATURE, DEFAULT_USER,
};
pub use status::InterviewStatus;
pub use transcript::{Transcript, TurnPair};
