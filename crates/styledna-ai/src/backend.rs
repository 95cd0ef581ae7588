//! Generation backend contract and the JSON-with-retry call wrapper.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::error::{AiError, AiResult};

/// A frame image embedded in a multimodal prompt.
#[derive(Debug, Clone)]
pub struct InlineImage {
    /// e.g. "image/jpeg"
    pub mime_type: String,
    /// Base64-encoded image bytes.
    pub data_base64: String,
}

/// A structured prompt for a generation backend.
///
/// Text-only backends ignore `images`.
#[derive(Debug, Clone, Default)]
pub struct GenerationPrompt {
    /// System-level instruction, when the backend distinguishes roles.
    pub system: Option<String>,
    pub text: String,
    pub images: Vec<InlineImage>,
}

impl GenerationPrompt {
    pub fn text_only(system: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            text: text.into(),
            images: Vec::new(),
        }
    }
}

/// Generation backend collaborator contract.
///
/// Implementations must reply with a single JSON document (the request
/// carries that requirement) and must surface rate-limit-class failures
/// as [`AiError::RateLimited`], distinguishable from terminal failures.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &GenerationPrompt) -> AiResult<String>;
}

/// Fixed backoff before the single rate-limit retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn with_backoff(backoff: Duration) -> Self {
        Self { backoff }
    }
}

/// Invoke a backend and parse its reply as a JSON object.
///
/// A rate-limit-class failure is retried exactly once after the fixed
/// backoff; the second attempt's outcome is final either way. Any other
/// failure, and any parse failure, is terminal immediately.
pub async fn generate_json(
    backend: &dyn GenerationBackend,
    prompt: &GenerationPrompt,
    retry: &RetryPolicy,
) -> AiResult<JsonValue> {
    let text = match backend.generate(prompt).await {
        Ok(text) => text,
        Err(e) if e.is_rate_limited() => {
            warn!(
                backoff_secs = retry.backoff.as_secs_f64(),
                "Generation backend rate limited, retrying once: {}", e
            );
            tokio::time::sleep(retry.backoff).await;
            backend.generate(prompt).await?
        }
        Err(e) => return Err(e),
    };

    parse_json_reply(&text)
}

/// Strip optional markdown code fences and parse the reply as a JSON object.
pub fn parse_json_reply(text: &str) -> AiResult<JsonValue> {
    let stripped = strip_code_fences(text);

    let value: JsonValue =
        serde_json::from_str(stripped).map_err(|e| AiError::Parse(e.to_string()))?;

    if !value.is_object() {
        return Err(AiError::Parse("response is not a JSON object".to_string()));
    }
    Ok(value)
}

fn strip_code_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}
