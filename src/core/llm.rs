use crate::config::Settings;
use crate::error::ResolutionError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Greedy decoding is always requested.
pub const TEMPERATURE: f32 = 0.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Anything that turns a prompt into completion text.
///
/// Information Hiding: the HTTP client, endpoint layout and credential stay
/// inside the implementation so the resolver can be exercised with fakes.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send one prompt as a single user message and return the reply text.
    async fn complete(&self, prompt: &str) -> Result<String, ResolutionError>;

    /// Model identifier requests are made against.
    fn model(&self) -> &str;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints (Groq by default).
pub struct LLMClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl LLMClient {
    pub fn new(api_key: String, settings: &Settings) -> Result<Self, ResolutionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.llm.timeout_secs))
            .build()
            .map_err(|e| ResolutionError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!(
                "{}/chat/completions",
                settings.llm.base_url.trim_end_matches('/')
            ),
            model: settings.llm.model.clone(),
        })
    }

    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ResolutionError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            stream: false,
        };

        tracing::debug!(
            "[LLMClient] POST {} (model {}, {} message(s))",
            self.endpoint,
            self.model,
            messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("[LLMClient] HTTP request failed: {}", e);
                ResolutionError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                "[LLMClient] API returned error status {}: {}",
                status,
                error_text
            );
            return Err(ResolutionError::Rejected {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let chat_response = response.json::<ChatResponse>().await.map_err(|e| {
            tracing::warn!("[LLMClient] Failed to decode response body: {}", e);
            ResolutionError::Malformed(e.to_string())
        })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ResolutionError::EmptyReply)
    }
}

#[async_trait]
impl CompletionService for LLMClient {
    async fn complete(&self, prompt: &str) -> Result<String, ResolutionError> {
        self.chat(&[ChatMessage::user(prompt)]).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
