//! OpenAI chat-completions backend for [`GenerativeModel`].
//!
//! # Example
//!
//! ```rust,ignore
//! use research_engine::ai::OpenAIModel;
//!
//! let model = OpenAIModel::new("sk-...")?.with_model("gpt-4o");
//! let text = model.generate("Summarize the market", 2048).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GenerationError, GenerationResult};
use crate::security::SecretString;
use crate::traits::GenerativeModel;

const SYSTEM_PROMPT: &str = "You are a market research analyst. You answer only with valid JSON \
built from the research you are given.";

/// Bound on one chat-completions call. Long reports take a while to generate.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(120);

fn model_client(timeout: Duration) -> GenerationResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| GenerationError::Http(Box::new(e)))
}

/// OpenAI-based generative model.
#[derive(Clone, Debug)]
pub struct OpenAIModel {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAIModel {
    /// Create a new OpenAI client with the given API key, bounded by
    /// [`DEFAULT_MODEL_TIMEOUT`].
    pub fn new(api_key: impl Into<SecretString>) -> GenerationResult<Self> {
        Ok(Self {
            client: model_client(DEFAULT_MODEL_TIMEOUT)?,
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.3,
            timeout: DEFAULT_MODEL_TIMEOUT,
        })
    }

    /// Bound every call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> GenerationResult<Self> {
        self.client = model_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a custom HTTP client. Its own timeout replaces this model's.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl GenerativeModel for OpenAIModel {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> GenerationResult<String> {
        if self.api_key.is_blank() {
            return Err(GenerationError::Config("OpenAI API key is empty".into()));
        }

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens,
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Calling chat completions");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Http(Box::new(e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }

    fn model_tag(&self) -> String {
        format!("openai/{}", self.model)
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_tag_names_provider_and_model() {
        let model = OpenAIModel::new("sk-test").unwrap().with_model("gpt-4o-mini");
        assert_eq!(model.model_tag(), "openai/gpt-4o-mini");
    }

    #[test]
    fn debug_never_prints_key() {
        let model = OpenAIModel::new("sk-very-secret").unwrap();
        assert!(!format!("{:?}", model).contains("sk-very-secret"));
    }

    #[tokio::test]
    async fn blank_key_is_config_error() {
        let err = OpenAIModel::new("  ")
            .unwrap()
            .generate("hi", 16)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Config(_)));
    }

    #[test]
    fn client_is_bounded_by_default() {
        let model = OpenAIModel::new("sk-test").unwrap();
        assert_eq!(model.timeout(), DEFAULT_MODEL_TIMEOUT);
    }

    #[tokio::test]
    async fn stalled_completion_fails_within_its_timeout() {
        let base_url = crate::testing::silent_endpoint().await;
        let model = OpenAIModel::new("sk-test")
            .unwrap()
            .with_timeout(Duration::from_millis(200))
            .unwrap()
            .with_base_url(base_url);

        let result = tokio::time::timeout(Duration::from_secs(5), model.generate("hi", 16))
            .await
            .expect("call should give up on its own");

        assert!(matches!(result, Err(GenerationError::Http(_))));
    }

    #[test]
    fn response_with_null_content_decodes() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
