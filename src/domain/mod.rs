//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machine)
//! - `prompt` - Prompt templates with strict placeholder validation
//! - `question` - Survey question records and choice selection
//! - `interview` - Interview aggregate, transcript, format adapters, end check

pub mod foundation;
pub mod interview;
pub mod prompt;
pub mod question;
