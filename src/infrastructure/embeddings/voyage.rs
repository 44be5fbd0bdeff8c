use super::{error_for_status, BATCH_SIZE};
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::infrastructure::http_client;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub struct VoyageProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct VoyageRequest<'a> {
    input: &'a [String],
    model: &'a str,
    input_type: &'static str,
}

#[derive(Deserialize)]
struct VoyageResponse {
    data: Vec<VoyageEmbedding>,
}

#[derive(Deserialize)]
struct VoyageEmbedding {
    embedding: Vec<f32>,
}

impl VoyageProvider {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Result<Self, DomainError> {
        Ok(Self {
            client: http_client(Duration::from_secs(30))?,
            api_key,
            model: model.unwrap_or_else(|| "voyage-4-lite".to_string()),
            base_url: base_url.unwrap_or_else(|| "https://api.voyageai.com".to_string()),
        })
    }

    fn model_dimension(model: &str) -> usize {
        match model {
            "voyage-4-lite" => 512,
            "voyage-3-lite" => 512,
            "voyage-3" => 1024,
            "voyage-3-large" | "voyage-large-2" => 1536,
            "voyage-code-3" => 1024,
            _ => 0,
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for VoyageProvider {
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        let it = match input_type {
            InputType::Document => "document",
            InputType::Query => "query",
        };
        let url = format!("{}/v1/embeddings", self.base_url.trim_end_matches('/'));

        let mut vectors = Vec::with_capacity(texts.len());
        for (i, chunk) in texts.chunks(BATCH_SIZE).enumerate() {
            debug!(batch = i, size = chunk.len(), "Voyage embedding batch");
            let resp = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&VoyageRequest {
                    input: chunk,
                    model: &self.model,
                    input_type: it,
                })
                .send()
                .await
                .map_err(|e| DomainError::Embedding(format!("Voyage API error: {e}")))?;

            if !resp.status().is_success() {
                return Err(error_for_status("Voyage", resp).await);
            }

            let result: VoyageResponse = resp
                .json()
                .await
                .map_err(|e| DomainError::Embedding(format!("Voyage parse error: {e}")))?;
            vectors.extend(result.data.into_iter().map(|d| d.embedding));
        }
        Ok(vectors)
    }

    /// 0 for models not in the table; the build then takes the dimension from the first response.
    fn dimension(&self) -> usize {
        Self::model_dimension(&self.model)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
