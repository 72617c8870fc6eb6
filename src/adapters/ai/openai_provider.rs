//! OpenAI-compatible Provider - Implementation of AIProvider for OpenAI and
//! Azure OpenAI chat completions.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::azure("https://my-resource.openai.azure.com", api_key)
//!     .with_model("gpt-4o-default")
//!     .with_api_version("2023-05-15");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! # Streaming
//!
//! Uses Server-Sent Events (SSE). Lines are buffered across network chunks,
//! so an event split between two reads is parsed once complete. Fragments are
//! yielded until the `[DONE]` marker is received.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use crate::domain::interview::ChatMessage;
use crate::ports::{
    AIError, AIProvider, ChunkStream, CompletionRequest, FinishReason, ProviderInfo, StreamChunk,
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2023-05-15";

/// Which wire dialect the endpoint speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    /// `POST {base_url}/chat/completions` with Bearer auth.
    OpenAI,
    /// `POST {endpoint}/openai/deployments/{model}/chat/completions` with `api-key` auth.
    Azure,
}

/// Configuration for the OpenAI-compatible provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Wire dialect.
    pub flavor: ApiFlavor,
    /// Default model (OpenAI) or deployment name (Azure).
    pub model: String,
    /// Base URL (OpenAI) or resource endpoint (Azure).
    pub base_url: String,
    /// `api-version` query parameter, Azure only.
    pub api_version: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAIConfig {
    /// Creates a configuration for the public OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            flavor: ApiFlavor::OpenAI,
            model: "gpt-4o".to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_version: DEFAULT_AZURE_API_VERSION.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Creates a configuration for an Azure OpenAI resource.
    pub fn azure(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            flavor: ApiFlavor::Azure,
            base_url: endpoint.into(),
            ..Self::new(api_key)
        }
    }

    /// Sets the model or deployment.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the Azure API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible provider implementation.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL for a model or deployment.
    fn completions_url(&self, model: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match self.config.flavor {
            ApiFlavor::OpenAI => format!("{}/chat/completions", base),
            ApiFlavor::Azure => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                base, model, self.config.api_version
            ),
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.config.flavor {
            ApiFlavor::OpenAI => {
                builder.header("Authorization", format!("Bearer {}", self.config.api_key()))
            }
            ApiFlavor::Azure => builder.header("api-key", self.config.api_key()),
        }
    }

    fn resolve_model<'a>(&'a self, request: &'a CompletionRequest) -> &'a str {
        if request.model.is_empty() {
            &self.config.model
        } else {
            &request.model
        }
    }

    /// Converts our request to the wire format.
    fn to_openai_request<'a>(&self, request: &'a CompletionRequest, model: &'a str) -> OpenAIRequest<'a> {
        OpenAIRequest {
            model: match self.config.flavor {
                ApiFlavor::OpenAI => Some(model),
                ApiFlavor::Azure => None,
            },
            messages: &request.messages,
            temperature: request.temperature,
            stream: true,
        }
    }

    /// Sends a streaming request.
    async fn send_streaming_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let model = self.resolve_model(request);
        let body = self.to_openai_request(request, model);

        tracing::debug!(
            interview_id = %request.metadata.interview_id,
            session_id = %request.metadata.session_id,
            model = %model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        self.authorize(self.client.post(self.completions_url(model)))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let retry_after_header = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok());
        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::rate_limited(
                retry_after_header.unwrap_or_else(|| Self::parse_retry_after(&error_body)),
            )),
            400 => {
                if error_body.contains("content_filter") {
                    Err(AIError::content_filtered(error_body))
                } else {
                    Err(AIError::InvalidRequest(error_body))
                }
            }
            404 => Err(AIError::InvalidRequest(format!(
                "model or deployment not found: {}",
                error_body
            ))),
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses retry-after from error response.
    fn parse_retry_after(error_body: &str) -> u32 {
        serde_json::from_str::<serde_json::Value>(error_body)
            .ok()
            .and_then(|parsed| {
                let message = parsed.get("error")?.get("message")?.as_str()?.to_string();
                let idx = message.find("try again in ")?;
                let rest = &message[idx + 13..];
                let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
                rest[..end].parse::<u32>().ok()
            })
            .unwrap_or(30)
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn stream_complete(&self, request: CompletionRequest) -> Result<ChunkStream, AIError> {
        let response = self.send_streaming_request(&request).await?;
        let response = Self::handle_response_status(response).await?;

        let state = (
            Box::pin(response.bytes_stream()),
            SseParser::default(),
            VecDeque::new(),
        );

        let stream = stream::unfold(state, |(mut bytes, mut parser, mut pending)| async move {
            loop {
                if let Some(item) = pending.pop_front() {
                    return Some((item, (bytes, parser, pending)));
                }
                if parser.is_done() {
                    return None;
                }
                match bytes.next().await {
                    Some(Ok(chunk)) => pending.extend(parser.push(&chunk)),
                    Some(Err(e)) => {
                        parser.abort();
                        pending.push_back(Err(AIError::network(format!("Stream error: {}", e))));
                    }
                    None => pending.extend(parser.finish()),
                }
            }
        });

        Ok(Box::pin(stream))
    }

    fn provider_info(&self) -> ProviderInfo {
        let name = match self.config.flavor {
            ApiFlavor::OpenAI => "openai",
            ApiFlavor::Azure => "azure-openai",
        };
        ProviderInfo::new(name, &self.config.model)
    }
}

/// Incremental SSE parser that keeps partial lines between reads.
#[derive(Debug, Default)]
struct SseParser {
    buffer: Vec<u8>,
    done: bool,
}

impl SseParser {
    /// Feeds raw bytes, returning chunks for every complete line.
    fn push(&mut self, bytes: &[u8]) -> Vec<Result<StreamChunk, AIError>> {
        if self.done {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);

        let mut results = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            self.parse_line(line.trim_end_matches(['\r', '\n']), &mut results);
            if self.done {
                self.buffer.clear();
                break;
            }
        }
        results
    }

    /// Parses whatever remains once the body ends.
    fn finish(&mut self) -> Vec<Result<StreamChunk, AIError>> {
        let mut results = Vec::new();
        if !self.done && !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest);
            self.parse_line(line.trim_end_matches(['\r', '\n']), &mut results);
        }
        self.done = true;
        results
    }

    fn abort(&mut self) {
        self.buffer.clear();
        self.done = true;
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn parse_line(&mut self, line: &str, results: &mut Vec<Result<StreamChunk, AIError>>) {
        let Some(data) = line.strip_prefix("data:") else {
            return;
        };
        let data = data.trim_start();

        if data == "[DONE]" {
            self.done = true;
            return;
        }
        if data.trim().is_empty() {
            return;
        }

        match serde_json::from_str::<StreamResponseChunk>(data) {
            Ok(chunk) => {
                // Azure sends a leading chunk with no choices (prompt filter results).
                let Some(choice) = chunk.choices.into_iter().next() else {
                    return;
                };
                if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                    results.push(Ok(StreamChunk::content(content)));
                }
                if let Some(reason) = choice.finish_reason {
                    results.push(Ok(StreamChunk::final_chunk(FinishReason::parse(&reason))));
                }
            }
            Err(e) => results.push(Err(AIError::parse(format!(
                "Failed to parse SSE chunk: {}",
                e
            )))),
        }
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct StreamResponseChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}
