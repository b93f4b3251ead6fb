/*!
 * Provider implementations for different text-generation services.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI: OpenAI API integration (also used for LM Studio)
 * - Anthropic: Anthropic API integration
 * - Ollama: Local LLM server
 * - Mock: scriptable provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Provider-neutral chat request: one system instruction, one user message
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model name
    pub model: String,
    /// Instruction sent as the system message
    pub system: String,
    /// Text sent as the user message
    pub user: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a new request with deterministic sampling
    pub fn new(model: impl Into<String>, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: system.into(),
            user: user.into(),
            temperature: 0.0,
            max_tokens: 4096,
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of generated tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation client.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request and return the generated text
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The text of the first choice, or an error.
    ///   HTTP 429 must surface as `ProviderError::RateLimitExceeded`.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;

    /// Short provider name for log lines
    fn name(&self) -> &'static str;
}

/// Build the HTTP provider selected in the configuration
pub fn build_provider(config: &TranslationConfig) -> anyhow::Result<Arc<dyn Provider>> {
    let timeout_secs = config.get_timeout_secs();
    let provider: Arc<dyn Provider> = match config.provider {
        TranslationProvider::OpenAI => Arc::new(openai::OpenAI::new(
            config.get_api_key(),
            config.get_endpoint(),
            timeout_secs,
        )),
        TranslationProvider::LMStudio => {
            // LM Studio often doesn't require an API key; use a default if empty
            let api_key = {
                let k = config.get_api_key();
                if k.is_empty() { "lm-studio".to_string() } else { k }
            };
            Arc::new(openai::OpenAI::new(api_key, config.get_endpoint(), timeout_secs))
        }
        TranslationProvider::Anthropic => Arc::new(anthropic::Anthropic::new(
            config.get_api_key(),
            config.get_endpoint(),
            timeout_secs,
        )),
        TranslationProvider::Ollama => {
            Arc::new(ollama::Ollama::from_endpoint(&config.get_endpoint(), timeout_secs)?)
        }
    };
    Ok(provider)
}

/// Map a transport failure from reqwest onto the provider error taxonomy
pub(crate) fn transport_error(provider: &str, error: reqwest::Error) -> ProviderError {
    if error.is_connect() || error.is_timeout() {
        ProviderError::ConnectionError(format!("{}: {}", provider, error))
    } else {
        ProviderError::RequestFailed(format!("{}: {}", provider, error))
    }
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
