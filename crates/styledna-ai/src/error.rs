//! Error types for generation backends.

use thiserror::Error;

/// Result type for AI operations.
pub type AiResult<T> = Result<T, AiError>;

/// Errors from the generation backends.
#[derive(Debug, Error)]
pub enum AiError {
    /// Transient upstream failure; the caller should back off and retry.
    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    /// Terminal upstream failure.
    #[error("Generation failed: {message}")]
    Backend { message: String },

    /// The backend replied, but not with the JSON document it was asked for.
    #[error("Failed to parse generation response: {0}")]
    Parse(String),

    #[error("Failed to process frame image: {0}")]
    Image(String),

    /// Required credential missing from the environment.
    #[error("{0} is not set")]
    MissingCredential(&'static str),
}

impl AiError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AiError::RateLimited { .. })
    }
}

/// Whether an upstream error body reads as a rate-limit/quota failure.
///
/// Some backends bury quota exhaustion in a 400/500 body instead of a 429
/// status, so the message pattern is checked as well.
pub fn is_rate_limit_message(message: &str) -> bool {
    let msg = message.to_lowercase();
    msg.contains("429")
        || msg.contains("quota")
        || msg.contains("rate limit")
        || msg.contains("resource_exhausted")
        || msg.contains("too many requests")
}
