/*!
 * Translation of group names into target-language labels.
 *
 * This module contains the client side of the pipeline:
 *
 * - `client`: Single-item and batch requests against a provider
 * - `parsing`: Batch response parsing (code fences, JSON array, length check)
 * - `backoff`: Rate-limit retry policy for the single-item path
 */

use async_trait::async_trait;

// Re-export main types for easier usage
pub use self::backoff::RetryPolicy;
pub use self::client::TranslationClient;
pub use self::parsing::parse_batch_response;

// Submodules
pub mod backoff;
pub mod client;
pub mod parsing;

/// The two translation modes the scheduler drives
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate one text; an empty string means "no translation available"
    async fn translate_single(&self, text: &str) -> String;

    /// Translate `lines` in one request; `None` when the call or its parsing failed
    /// or the response does not hold exactly one label per line
    async fn translate_batch(&self, lines: &[String]) -> Option<Vec<String>>;
}
