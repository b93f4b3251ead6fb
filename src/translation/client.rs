/*!
 * Translation client for directory-name labels.
 *
 * Wraps a text-generation provider with the two request shapes the scheduler
 * needs: one name at a time, and many newline-joined names answered as a JSON
 * array. Only the one-at-a-time path waits out rate limits; a failed batch is
 * reported to the caller, which shrinks the batch instead.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;

use crate::app_config::Config;
use crate::language_utils;
use crate::providers::{build_provider, CompletionRequest, Provider};

use super::backoff::RetryPolicy;
use super::parsing::parse_batch_response;
use super::Translator;

/// Placeholder replaced by the target language name in prompt templates
const TARGET_LANGUAGE_PLACEHOLDER: &str = "{target_language}";

/// Translation client over any `Provider`
#[derive(Debug, Clone)]
pub struct TranslationClient {
    /// Provider implementation
    provider: Arc<dyn Provider>,
    /// Model name sent with every request
    model: String,
    /// System prompt for one-item requests
    single_prompt: String,
    /// System prompt for batch requests
    batch_prompt: String,
    /// Sampling temperature
    temperature: f32,
    /// Token cap per request
    max_tokens: u32,
    /// Rate-limit handling for the single-item path
    retry_policy: RetryPolicy,
}

impl TranslationClient {
    /// Create a client translating into `target_language_name` with default prompts
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, target_language_name: &str) -> Self {
        let common = crate::app_config::TranslationCommonConfig::default();
        Self {
            provider,
            model: model.into(),
            single_prompt: render_prompt(&common.single_prompt, target_language_name),
            batch_prompt: render_prompt(&common.batch_prompt, target_language_name),
            temperature: common.temperature,
            max_tokens: common.max_tokens,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Create the client described by the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = build_provider(&config.translation)?;
        let language_name = language_utils::get_language_name(&config.target_language)?;
        let common = &config.translation.common;

        Ok(Self::new(provider, config.translation.get_model(), &language_name)
            .with_prompts(
                render_prompt(&common.single_prompt, &language_name),
                render_prompt(&common.batch_prompt, &language_name),
            )
            .with_sampling(common.temperature, common.max_tokens)
            .with_retry_policy(RetryPolicy::from(&common.rate_limit)))
    }

    /// Replace both system prompts (already rendered)
    pub fn with_prompts(mut self, single_prompt: impl Into<String>, batch_prompt: impl Into<String>) -> Self {
        self.single_prompt = single_prompt.into();
        self.batch_prompt = batch_prompt.into();
        self
    }

    /// Set temperature and token cap
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Set the rate-limit retry policy
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Model used for requests
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, system: &str, user: String) -> CompletionRequest {
        CompletionRequest::new(&self.model, system, user)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
    }
}

/// Substitute the target language name into a prompt template
pub fn render_prompt(template: &str, target_language_name: &str) -> String {
    template.replace(TARGET_LANGUAGE_PLACEHOLDER, target_language_name)
}

#[async_trait]
impl Translator for TranslationClient {
    async fn translate_single(&self, text: &str) -> String {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            debug!("→ translate_single('{}') attempt {}", text, attempts);
            let start_time = Instant::now();

            match self.provider.complete(self.request(&self.single_prompt, text.to_string())).await {
                Ok(content) => {
                    let label = content.trim().to_string();
                    info!("← translate_single('{}') → '{}' in {:?}", text, label, start_time.elapsed());
                    return label;
                }
                Err(e) if e.is_rate_limit() => {
                    if !self.retry_policy.allows_another(attempts) {
                        warn!("Rate limited on '{}' after {} attempts, giving up: {}", text, attempts, e);
                        return String::new();
                    }
                    let delay = self.retry_policy.delay_for(attempts - 1);
                    warn!("Rate limited on '{}': {} (waiting {:?})", text, e, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!("Single translation of '{}' failed, skipping: {}", text, e);
                    return String::new();
                }
            }
        }
    }

    async fn translate_batch(&self, lines: &[String]) -> Option<Vec<String>> {
        if lines.is_empty() {
            return Some(Vec::new());
        }

        info!("→ translate_batch ({} items)", lines.len());
        // One key per line, so embedded line breaks would shift the count
        let prompt = lines
            .iter()
            .map(|line| line.replace(['\r', '\n'], " "))
            .collect::<Vec<_>>()
            .join("\n");
        let start_time = Instant::now();

        let raw = match self.provider.complete(self.request(&self.batch_prompt, prompt)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Batch call of {} items failed: {}", lines.len(), e);
                return None;
            }
        };

        match parse_batch_response(&raw, lines.len()) {
            Ok(labels) => {
                info!("← translate_batch ({} items) in {:?}", lines.len(), start_time.elapsed());
                Some(labels)
            }
            Err(e) => {
                warn!("Could not parse batch response of {} items: {}", lines.len(), e);
                None
            }
        }
    }
}
