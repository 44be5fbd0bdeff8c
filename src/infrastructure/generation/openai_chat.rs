use super::{error_for_status, transport_error, GenerationParams};
use crate::domain::error::{DomainError, FailureKind};
use crate::domain::ports::generation_port::TextGenerator;
use crate::infrastructure::http_client;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Any OpenAI-compatible `/chat/completions` endpoint (OpenAI, Groq, a local llama.cpp server, ...).
pub struct OpenAiChatGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    params: GenerationParams,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiChatGenerator {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            params: GenerationParams::default(),
        })
    }
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiChatGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self.client.post(&url).json(&ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.params.max_output_tokens,
            temperature: self.params.temperature,
        });
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let resp = req.send().await.map_err(|e| transport_error("OpenAI", e))?;
        if !resp.status().is_success() {
            return Err(error_for_status("OpenAI", resp).await);
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::fallback(FailureKind::Malformed, format!("OpenAI parse error: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| DomainError::fallback(FailureKind::Malformed, "OpenAI returned no choices"))
    }

    fn name(&self) -> &str {
        "openai"
    }
}
