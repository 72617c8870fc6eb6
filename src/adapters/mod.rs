//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Chat completion providers (OpenAI, Azure OpenAI, mock)
//! - `archive` - Transcript archives (Azure Blob, local directory, in-memory)
//! - `assets` - Survey question catalogs
//! - `chat_log` - Per-session turn logs
//! - `http` - REST and WebSocket API
//! - `storage` - Live interview store

pub mod ai;
pub mod archive;
pub mod assets;
pub mod chat_log;
pub mod http;
pub mod storage;
