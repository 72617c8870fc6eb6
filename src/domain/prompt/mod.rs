//! Prompt module - templates for the opening and system messages.

mod template;

pub use template::{PromptTemplate, TemplateArgs, TemplateError};
