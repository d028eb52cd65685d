//! ChatGPT Provider - GenerationProvider over the OpenAI chat completions API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = ChatGptConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let provider = ChatGptProvider::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    GenerationError, GenerationProvider, GenerationRequest, ProviderKind, ProviderResponse,
};

/// Configuration for the ChatGPT provider.
#[derive(Debug, Clone)]
pub struct ChatGptConfig {
    api_key: Secret<String>,
    /// Model to use (e.g. "gpt-4o-mini").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl ChatGptConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// ChatGPT API provider implementation.
pub struct ChatGptProvider {
    config: ChatGptConfig,
    client: Client,
}

impl ChatGptProvider {
    /// Creates a new ChatGPT provider with the given configuration.
    pub fn new(config: ChatGptConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_api_request(&self, request: &GenerationRequest) -> ChatGptRequest {
        ChatGptRequest {
            model: self.config.model.clone(),
            messages: vec![ChatGptMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            max_tokens: request.max_output_tokens,
            temperature: request.temperature,
        }
    }

    async fn send_request(&self, request: &GenerationRequest) -> Result<Response, GenerationError> {
        let api_request = self.to_api_request(request);

        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    GenerationError::network(format!("Connection failed: {}", e))
                } else {
                    GenerationError::network(e.to_string())
                }
            })
    }

    async fn handle_response_status(
        &self,
        response: Response,
    ) -> Result<Response, GenerationError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(GenerationError::AuthenticationFailed),
            429 => Err(GenerationError::RateLimited {
                retry_after_secs: parse_retry_after(&error_body),
            }),
            400 => Err(GenerationError::InvalidRequest(error_body)),
            500..=599 => Err(GenerationError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(GenerationError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }
}

/// Parses retry-after from the error body; defaults to 30 seconds.
fn parse_retry_after(error_body: &str) -> u32 {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
        if let Some(s) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            if let Some(idx) = s.find("try again in ") {
                let rest = &s[idx + 13..];
                if let Some(num_end) = rest.find(|c: char| !c.is_ascii_digit()) {
                    if let Ok(secs) = rest[..num_end].parse::<u32>() {
                        return secs;
                    }
                }
            }
        }
    }
    30
}

#[async_trait]
impl GenerationProvider for ChatGptProvider {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderResponse, GenerationError> {
        let response = self.send_request(request).await?;
        let response = self.handle_response_status(response).await?;

        let body: ChatGptResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or(GenerationError::EmptyOutput)?;

        Ok(ProviderResponse {
            content: choice.message.content,
            model: body.model,
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::ChatGpt
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct ChatGptRequest {
    model: String,
    messages: Vec<ChatGptMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatGptMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatGptResponse {
    model: String,
    choices: Vec<ChatGptChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatGptChoice {
    message: ChatGptMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ArtworkId;
    use crate::domain::persona::Persona;
    use crate::domain::prompt::TaskType;

    fn provider() -> ChatGptProvider {
        ChatGptProvider::new(ChatGptConfig::new("sk-test"))
    }

    #[test]
    fn config_builder_sets_fields() {
        let config = ChatGptConfig::new("sk-test")
            .with_model("gpt-4o")
            .with_base_url("http://localhost:9999/v1")
            .with_timeout(Duration::from_secs(10));

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.base_url, "http://localhost:9999/v1");
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn completions_url_appends_path() {
        assert_eq!(
            provider().completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn request_maps_prompt_and_parameters() {
        let request = GenerationRequest::new(
            TaskType::Keywords,
            "Produce keywords",
            Persona::Guide,
            ArtworkId::new(),
        )
        .with_temperature(0.3)
        .with_max_output_tokens(256);

        let api_request = provider().to_api_request(&request);

        assert_eq!(api_request.messages.len(), 1);
        assert_eq!(api_request.messages[0].role, "user");
        assert_eq!(api_request.messages[0].content, "Produce keywords");
        assert_eq!(api_request.temperature, 0.3);
        assert_eq!(api_request.max_tokens, 256);
    }

    #[test]
    fn retry_after_parses_from_error_message() {
        let body = r#"{"error":{"message":"Rate limit reached, try again in 12s."}}"#;
        assert_eq!(parse_retry_after(body), 12);
    }

    #[test]
    fn retry_after_defaults_on_unparseable_body() {
        assert_eq!(parse_retry_after("not json"), 30);
    }

    #[test]
    fn response_body_deserializes() {
        let json = r#"{
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": "Oil Paint, Gouache"}}]
        }"#;
        let body: ChatGptResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.choices[0].message.content, "Oil Paint, Gouache");
    }
}
