/*!
 * Error types for the dirtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Build the error matching an HTTP status returned by a provider
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            429 => Self::RateLimitExceeded(message),
            401 | 403 => Self::AuthenticationError(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Whether the service asked us to slow down.
    ///
    /// Some gateways report throttling as a generic error whose body mentions
    /// the limit, so the message text is checked as well.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, message } => {
                *status_code == 429 || message.to_lowercase().contains("rate limit")
            }
            Self::RequestFailed(message) => message.to_lowercase().contains("rate limit"),
            _ => false,
        }
    }
}

/// Reasons a batch response could not be turned into one label per input line
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchParseError {
    /// The service returned nothing
    #[error("empty response")]
    EmptyResponse,

    /// No `[` ... `]` span in the response
    #[error("no JSON array found in response")]
    NoArray,

    /// The bracketed span is not an array of strings
    #[error("invalid JSON array: {0}")]
    InvalidJson(String),

    /// The array has the wrong number of elements
    #[error("expected {expected} translations, got {actual}")]
    LengthMismatch {
        /// Number of lines sent
        expected: usize,
        /// Number of strings received
        actual: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the checkpoint database
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Checkpoint(error.to_string())
    }
}
