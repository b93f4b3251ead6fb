/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds, echoing the user message
 * - `MockProvider::rate_limited_then(n)` - Throttles the first n requests
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::scripted(..)` - Replays a fixed sequence of replies
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use super::{CompletionRequest, Provider};

/// One canned reply for `MockBehavior::Scripted`
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Successful completion with this text
    Text(String),
    /// HTTP 429
    RateLimited,
    /// HTTP 500
    Fail,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Rate limited for the first `failures` requests, then succeeds
    RateLimitedThen { failures: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
    /// Pops replies from the script; falls back to `Working` once exhausted
    Scripted,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> String>,
    /// Remaining scripted replies
    script: Arc<Mutex<VecDeque<MockReply>>>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that is rate limited `failures` times before answering
    pub fn rate_limited_then(failures: usize) -> Self {
        Self::new(MockBehavior::RateLimitedThen { failures })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that replays `replies` in order
    pub fn scripted(replies: Vec<MockReply>) -> Self {
        let provider = Self::new(MockBehavior::Scripted);
        provider.script.lock().extend(replies);
        provider
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    fn respond(&self, request: &CompletionRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => request.user.clone(),
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
            script: Arc::clone(&self.script),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(self.respond(&request)),

            MockBehavior::RateLimitedThen { failures } => {
                if count < failures {
                    Err(ProviderError::RateLimitExceeded(format!(
                        "Simulated 429 (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(self.respond(&request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Scripted => {
                let next = self.script.lock().pop_front();
                match next {
                    Some(MockReply::Text(text)) => Ok(text),
                    Some(MockReply::RateLimited) => {
                        Err(ProviderError::RateLimitExceeded("Simulated 429".to_string()))
                    }
                    Some(MockReply::Fail) => Err(ProviderError::ApiError {
                        message: "Simulated provider failure".to_string(),
                        status_code: 500,
                    }),
                    None => Ok(self.respond(&request)),
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
