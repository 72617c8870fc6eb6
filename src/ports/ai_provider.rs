//! AI Provider Port - Interface for chat-completion integrations.
//!
//! The interview engine only ever streams: every participant turn becomes one
//! streaming completion whose fragments are appended to the pending reply.
//!
//! # Example
//!
//! ```ignore
//! let request = CompletionRequest::new(metadata)
//!     .with_messages(turn.messages)
//!     .with_model("gpt-4o-default")
//!     .with_temperature(0.0);
//!
//! let mut stream = provider.stream_complete(request).await?;
//! while let Some(chunk) = stream.next().await {
//!     print!("{}", chunk?.delta);
//! }
//! ```

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::domain::foundation::{InterviewId, SessionId};
use crate::domain::interview::ChatMessage;

/// Finite, non-restartable stream of completion fragments.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, AIError>> + Send>>;

/// Port for chat-completion providers.
///
/// Implementations connect to an external completion API and translate
/// between its wire format and our domain types.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Starts a streaming completion.
    ///
    /// Errors returned here mean the call itself failed; errors yielded by
    /// the stream mean it broke off mid-way.
    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System message, history and the latest user message, in order.
    pub messages: Vec<ChatMessage>,
    /// Model or deployment name. Providers fall back to their default when empty.
    pub model: String,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Request metadata for tracing.
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    /// Creates an empty request with the given metadata.
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            messages: Vec::new(),
            model: String::new(),
            temperature: None,
            metadata,
        }
    }

    /// Appends a message.
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Appends several messages.
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Sets the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// Request metadata for tracing.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub interview_id: InterviewId,
    pub session_id: SessionId,
}

impl RequestMetadata {
    pub fn new(interview_id: InterviewId, session_id: SessionId) -> Self {
        Self {
            interview_id,
            session_id,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit the token limit.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
}

impl FinishReason {
    /// Parses an OpenAI-style `finish_reason` string.
    pub fn parse(reason: &str) -> Self {
        match reason {
            "length" => FinishReason::Length,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        }
    }
}

/// Streaming chunk from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    /// New content in this chunk.
    pub delta: String,
    /// If present, generation is complete.
    pub finish_reason: Option<FinishReason>,
}

impl StreamChunk {
    /// Creates a content chunk.
    pub fn content(delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
            finish_reason: None,
        }
    }

    /// Creates a final chunk.
    pub fn final_chunk(finish_reason: FinishReason) -> Self {
        Self {
            delta: String::new(),
            finish_reason: Some(finish_reason),
        }
    }

    /// Returns true if this is the final chunk.
    pub fn is_final(&self) -> bool {
        self.finish_reason.is_some()
    }
}

/// Provider information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "openai", "azure-openai").
    pub name: String,
    /// Model or deployment identifier.
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// AI provider errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Content was filtered for safety.
    #[error("content filtered: {reason}")]
    ContentFiltered {
        /// Reason for filtering.
        reason: String,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl AIError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates a content filtered error.
    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Short machine-readable kind, used in client-facing failure events.
    pub fn kind(&self) -> &'static str {
        match self {
            AIError::RateLimited { .. } => "rate_limited",
            AIError::ContentFiltered { .. } => "content_filtered",
            AIError::Unavailable { .. } => "unavailable",
            AIError::AuthenticationFailed => "authentication_failed",
            AIError::Network(_) => "network",
            AIError::Parse(_) => "parse",
            AIError::InvalidRequest(_) => "invalid_request",
            AIError::Timeout { .. } => "timeout",
        }
    }

    /// Returns true if resubmitting the same turn may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }
}
