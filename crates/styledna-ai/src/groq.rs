//! Groq generation backend (text-only, OpenAI-compatible chat API).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{GenerationBackend, GenerationPrompt};
use crate::error::{is_rate_limit_message, AiError, AiResult};

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Groq API client.
pub struct GroqBackend {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f64,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl GroqBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.3,
            client: Client::new(),
        }
    }

    /// Create a client from `GROQ_API_KEY`.
    pub fn from_env() -> AiResult<Self> {
        let api_key =
            std::env::var("GROQ_API_KEY").map_err(|_| AiError::MissingCredential("GROQ_API_KEY"))?;
        let model = std::env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_key, model))
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl GenerationBackend for GroqBackend {
    async fn generate(&self, prompt: &GenerationPrompt) -> AiResult<String> {
        if !prompt.images.is_empty() {
            warn!(
                images = prompt.images.len(),
                "Text-only backend ignoring prompt images"
            );
        }

        let mut messages = Vec::new();
        if let Some(system) = &prompt.system {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.text.clone(),
        });

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        info!(model = %self.model, "Calling Groq API");

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::backend(format!("Groq API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            debug!(status = %status, "Groq error body: {}", error_text);

            if status.as_u16() == 429 || is_rate_limit_message(&error_text) {
                return Err(AiError::rate_limited(format!(
                    "Groq API returned {}: {}",
                    status, error_text
                )));
            }
            return Err(AiError::backend(format!(
                "Groq API returned {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::backend(format!("Failed to parse Groq response: {}", e)))?;

        chat_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| AiError::backend("No choices in Groq response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_returns_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "{\"title\":\"t\"}"}}]
            })))
            .mount(&server)
            .await;

        let backend = GroqBackend::new("key", "llama-3.3-70b-versatile").with_base_url(server.uri());
        let text = backend
            .generate(&GenerationPrompt::text_only("sys", "user"))
            .await
            .unwrap();
        assert_eq!(text, "{\"title\":\"t\"}");
    }

    #[tokio::test]
    async fn test_429_maps_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limit reached"))
            .mount(&server)
            .await;

        let backend = GroqBackend::new("key", "llama-3.3-70b-versatile").with_base_url(server.uri());
        let err = backend.generate(&GenerationPrompt::default()).await.unwrap_err();
        assert!(err.is_rate_limited());
    }
}
