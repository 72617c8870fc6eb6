//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling real completion APIs.
//!
//! # Features
//!
//! - Pre-configured responses, streamed word by word
//! - Error injection at call time or mid-stream
//! - Simulated delays
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response("Could you tell me more?")
//!     .with_broken_stream("Half a rep", MockError::Network { message: "reset".into() });
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, FinishReason, ProviderInfo, StreamChunk,
};

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Provider info to return.
    info: ProviderInfo,
    /// Simulated latency per request and per fragment.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream the content, then a final chunk.
    Success {
        content: String,
        finish_reason: FinishReason,
    },
    /// Fail the call before any fragment.
    Error(MockError),
    /// Stream `partial`, then fail.
    BrokenStream { partial: String, error: MockError },
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAIProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
            finish_reason: FinishReason::Stop,
        })
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Adds a response that breaks off after `partial`.
    pub fn with_broken_stream(self, partial: impl Into<String>, error: MockError) -> Self {
        self.push(MockResponse::BrokenStream {
            partial: partial.into(),
            error,
        })
    }

    /// Sets simulated latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Gets the next response or a default.
    fn next_response(&self) -> MockResponse {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: "Mock response".to_string(),
                finish_reason: FinishReason::Stop,
            })
    }

    /// Splits text into word fragments whose concatenation is the original.
    fn fragments(content: &str) -> Vec<Result<StreamChunk, AIError>> {
        content
            .split_inclusive(' ')
            .map(|s| Ok(StreamChunk::content(s)))
            .collect()
    }

    fn paced(&self, items: Vec<Result<StreamChunk, AIError>>) -> ChunkStream {
        let delay = self.delay;
        Box::pin(stream::iter(items).then(move |item| async move {
            if !delay.is_zero() {
                sleep(delay / 10).await;
            }
            item
        }))
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success {
                content,
                finish_reason,
            } => {
                let mut items = Self::fragments(&content);
                items.push(Ok(StreamChunk::final_chunk(finish_reason)));
                Ok(self.paced(items))
            }
            MockResponse::Error(err) => Err(err.into()),
            MockResponse::BrokenStream { partial, error } => {
                let mut items = Self::fragments(&partial);
                items.push(Err(error.into()));
                Ok(self.paced(items))
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
