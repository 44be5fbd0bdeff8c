use super::{error_for_status, transport_error, GenerationParams};
use crate::domain::error::{DomainError, FailureKind};
use crate::domain::ports::generation_port::TextGenerator;
use crate::infrastructure::http_client;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini `generateContent`.
pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    params: GenerationParams,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiGenerator {
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
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let resp = self
            .client
            .post(&url)
            // Key goes in a header, not the query string, so it never ends up in logs.
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest {
                contents: vec![Content {
                    role: "user",
                    parts: vec![RequestPart { text: prompt }],
                }],
                generation_config: GenerationConfig {
                    max_output_tokens: self.params.max_output_tokens,
                    temperature: self.params.temperature,
                },
            })
            .send()
            .await
            .map_err(|e| transport_error("Gemini", e))?;

        if !resp.status().is_success() {
            return Err(error_for_status("Gemini", resp).await);
        }

        let body: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::fallback(FailureKind::Malformed, format!("Gemini parse error: {e}")))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(DomainError::fallback(FailureKind::Malformed, "Gemini returned no text"));
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
