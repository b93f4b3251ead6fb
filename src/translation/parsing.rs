/*!
 * Parsing of batch translation responses.
 *
 * A batch request asks for a JSON array with one string per input line. Models
 * wrap that array in code fences or prose often enough that the parser only
 * trusts the span between the first `[` and the last `]`.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::BatchParseError;

/// Fenced block covering the whole response, language tag optional
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[^\n]*\n(.*?)\n?```\s*$").expect("fence pattern is valid")
});

/// Remove a surrounding Markdown code fence, if any
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(captures) = FENCED_BLOCK.captures(trimmed) {
        if let Some(body) = captures.get(1) {
            return body.as_str();
        }
    }
    // Unterminated fence: drop the opening line only
    if trimmed.starts_with("```") {
        return trimmed.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    }
    trimmed
}

/// Turn a raw batch response into exactly `expected` trimmed labels
pub fn parse_batch_response(raw: &str, expected: usize) -> Result<Vec<String>, BatchParseError> {
    if raw.trim().is_empty() {
        return Err(BatchParseError::EmptyResponse);
    }

    let body = strip_code_fence(raw);
    let start = body.find('[').ok_or(BatchParseError::NoArray)?;
    let end = body.rfind(']').ok_or(BatchParseError::NoArray)?;
    if end < start {
        return Err(BatchParseError::NoArray);
    }

    let labels: Vec<String> = serde_json::from_str(&body[start..=end])
        .map_err(|e| BatchParseError::InvalidJson(e.to_string()))?;

    if labels.len() != expected {
        return Err(BatchParseError::LengthMismatch {
            expected,
            actual: labels.len(),
        });
    }

    Ok(labels.into_iter().map(|label| label.trim().to_string()).collect())
}
