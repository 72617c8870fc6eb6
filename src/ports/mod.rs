//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Streaming chat completions
//! - `ChatLogger` - Append-only per-session turn log
//! - `TranscriptArchive` - Durable upload of finished transcripts
//! - `QuestionCatalog` - Survey question lookup
//! - `InterviewStore` - Live interviews keyed by interview id

mod ai_provider;
mod chat_logger;
mod interview_store;
mod question_catalog;
mod transcript_archive;

pub use ai_provider::{
    AIError, AIProvider, ChunkStream, CompletionRequest, FinishReason, ProviderInfo,
    RequestMetadata, StreamChunk,
};
pub use chat_logger::{ChatLogger, LogEntry, LogError, LogRole};
pub use interview_store::{InterviewStore, SharedInterview, StoreError};
pub use question_catalog::{CatalogError, QuestionCatalog};
pub use transcript_archive::{to_ndjson, ArchiveError, TranscriptArchive};
