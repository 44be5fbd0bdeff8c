use super::{error_for_status, BATCH_SIZE};
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::infrastructure::http_client;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

pub const DEFAULT_MODEL: &str = "all-minilm";
pub const DEFAULT_URL: &str = "http://localhost:11434";

/// Sentence-embedding model served by a local Ollama instance.
///
/// The first call checks that the model is pulled; the check runs once per
/// process even when several requests race to be first.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    ready: OnceCell<()>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct TagsResponse {
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaProvider {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Result<Self, DomainError> {
        Ok(Self {
            client: http_client(Duration::from_secs(60))?,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ready: OnceCell::new(),
        })
    }

    async fn ensure_model(&self) -> Result<(), DomainError> {
        self.ready
            .get_or_try_init(|| async {
                let url = format!("{}/api/tags", self.base_url);
                let resp = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| DomainError::Embedding(format!("Ollama unreachable at {}: {e}", self.base_url)))?;
                if !resp.status().is_success() {
                    return Err(error_for_status("Ollama", resp).await);
                }
                let tags: TagsResponse = resp
                    .json()
                    .await
                    .map_err(|e| DomainError::Embedding(format!("Ollama parse error: {e}")))?;

                let wanted = self.model.split(':').next().unwrap_or(&self.model);
                if tags
                    .models
                    .iter()
                    .any(|m| m.name == self.model || m.name.split(':').next() == Some(wanted))
                {
                    info!(model = %self.model, "Ollama embedding model available");
                    Ok(())
                } else {
                    Err(DomainError::Embedding(format!(
                        "Ollama model '{}' is not pulled; run `ollama pull {}`",
                        self.model, self.model
                    )))
                }
            })
            .await
            .map(|_| ())
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        self.ensure_model().await?;

        let url = format!("{}/api/embed", self.base_url);
        let mut vectors = Vec::with_capacity(texts.len());
        for (i, chunk) in texts.chunks(BATCH_SIZE).enumerate() {
            debug!(batch = i, size = chunk.len(), "Ollama embedding batch");
            let resp = self
                .client
                .post(&url)
                .json(&EmbedRequest {
                    model: &self.model,
                    input: chunk,
                })
                .send()
                .await
                .map_err(|e| DomainError::Embedding(format!("Ollama API error: {e}")))?;

            if !resp.status().is_success() {
                return Err(error_for_status("Ollama", resp).await);
            }

            let result: EmbedResponse = resp
                .json()
                .await
                .map_err(|e| DomainError::Embedding(format!("Ollama parse error: {e}")))?;
            vectors.extend(result.embeddings);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        match self.model.split(':').next().unwrap_or(&self.model) {
            "all-minilm" => 384,
            "nomic-embed-text" => 768,
            "mxbai-embed-large" => 1024,
            _ => 0,
        }
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
