/*!
 * Tests for error types
 */

use dirtrans::errors::{AppError, BatchParseError, ProviderError};

#[test]
fn test_fromStatus_shouldClassifyStatusCodes() {
    assert!(matches!(ProviderError::from_status(429, "slow down"), ProviderError::RateLimitExceeded(_)));
    assert!(matches!(ProviderError::from_status(401, "bad key"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, "forbidden"), ProviderError::AuthenticationError(_)));
    assert!(matches!(
        ProviderError::from_status(500, "boom"),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_isRateLimit_shouldRecognizeStatusAndMessage() {
    assert!(ProviderError::RateLimitExceeded("x".to_string()).is_rate_limit());
    assert!(ProviderError::ApiError { status_code: 429, message: String::new() }.is_rate_limit());
    assert!(ProviderError::ApiError { status_code: 400, message: "Rate limit reached for model".to_string() }.is_rate_limit());
    assert!(!ProviderError::ApiError { status_code: 500, message: "internal".to_string() }.is_rate_limit());
    assert!(!ProviderError::ConnectionError("refused".to_string()).is_rate_limit());
    assert!(!ProviderError::AuthenticationError("rate limit".to_string()).is_rate_limit());
}

#[test]
fn test_batchParseError_display_shouldDescribeMismatch() {
    let error = BatchParseError::LengthMismatch { expected: 3, actual: 2 };
    assert_eq!(error.to_string(), "expected 3 translations, got 2");
    assert_eq!(BatchParseError::NoArray.to_string(), "no JSON array found in response");
}

#[test]
fn test_appError_fromProviderError_shouldWrap() {
    let error: AppError = ProviderError::ConnectionError("refused".to_string()).into();
    assert!(matches!(error, AppError::Provider(_)));
    assert!(error.to_string().contains("refused"));
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(_)));
}
