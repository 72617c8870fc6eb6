//! Chat Log Adapters.
//!
//! - `JsonlChatLogger` - One JSON-lines file per session
//! - `InMemoryChatLogger` - Test double

mod in_memory_chat_logger;
mod jsonl_chat_logger;

pub use in_memory_chat_logger::InMemoryChatLogger;
pub use jsonl_chat_logger::JsonlChatLogger;
