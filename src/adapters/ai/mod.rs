//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - OpenAI and Azure OpenAI streaming chat completions
//! - `MockAIProvider` - Configurable mock for testing

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse};
pub use openai_provider::{
    ApiFlavor, OpenAIConfig, OpenAIProvider, DEFAULT_AZURE_API_VERSION, DEFAULT_OPENAI_BASE_URL,
};
