// llm.rs - Chat Completion Client
// Talks to an OpenAI-compatible /v1/chat/completions endpoint (Ollama, LM Studio).
// Requests are single-shot and non-streaming; failures are returned, not retried.

use crate::config::LlmConfig;
use crate::error::{BotError, BotResult};
use async_trait::async_trait;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// Chat message structure for the completion API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Anything that turns an ordered message list into generated text.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> BotResult<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

pub struct LmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LmClient {
    pub fn new(config: LlmConfig) -> BotResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(30))
            .user_agent("Llama-TLDR-Bot/0.1")
            .build()
            .map_err(|e| BotError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url)
    }
}

#[async_trait]
impl ChatBackend for LmClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> BotResult<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: &messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };
        let prompt_chars: usize = messages.iter().map(|m| m.content.len()).sum();
        debug!("🤖 Sending {} messages ({} chars) to {}", messages.len(), prompt_chars, self.config.model);

        let mut builder = self.http.post(self.endpoint()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let start = Instant::now();
        let response = builder.send().await.map_err(request_failed)?;
        let status = response.status();
        trace!("🔍 Completion HTTP status {} after {:.2}s", status, start.elapsed().as_secs_f64());

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(BotError::Llm(format!(
                "HTTP {} from {}: {}",
                status,
                self.config.model,
                body.chars().take(300).collect::<String>()
            )));
        }

        let json: serde_json::Value = response.json().await.map_err(request_failed)?;
        let content = extract_content(&json)?;
        debug!("✅ Completion returned {} chars in {:.2}s", content.len(), start.elapsed().as_secs_f64());
        Ok(content)
    }
}

fn request_failed(error: reqwest::Error) -> BotError {
    BotError::Llm(error.to_string())
}

/// Pull the assistant text out of a chat-completion response body.
fn extract_content(json: &serde_json::Value) -> BotResult<String> {
    if let Some(error) = json.get("error") {
        return Err(BotError::Llm(format!("backend reported error: {}", error)));
    }
    json["choices"]
        .get(0)
        .and_then(|choice| choice["message"]["content"].as_str())
        .map(|content| content.trim().to_string())
        .ok_or_else(|| BotError::Llm("unexpected response format: no choices[0].message.content".to_string()))
}
