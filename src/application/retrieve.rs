use crate::domain::entities::knowledge_index::KnowledgeIndex;
use crate::domain::entities::retrieval_result::RetrievalResult;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::domain::values::normalized_text::NormalizedText;
use std::sync::Arc;
use tracing::{error, warn};

/// Embeds a query and ranks indexed rows by squared Euclidean distance.
///
/// Scores are only meaningful when `embedder` is the same model the index was
/// built with. That is a deployment precondition: the index records its model
/// id and a mismatch is logged, but vectors from a different model with the
/// same dimension cannot be told apart.
pub struct RetrieveUseCase {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<KnowledgeIndex>,
}

impl RetrieveUseCase {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<KnowledgeIndex>) -> Self {
        if embedder.model_id() != index.model_id() {
            warn!(
                index_model = %index.model_id(),
                query_model = %embedder.model_id(),
                "Index was built with a different embedding model; rebuild it before serving"
            );
        }
        Self { embedder, index }
    }

    pub fn index(&self) -> &KnowledgeIndex {
        &self.index
    }

    /// Up to `k` rows, best first. An empty index yields an empty result.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>, DomainError> {
        if k == 0 {
            return Err(DomainError::InvalidInput("k must be greater than zero".into()));
        }
        if self.index.is_empty() {
            return Ok(vec![]);
        }

        let normalized = NormalizedText::new(query);
        let vector = self
            .embedder
            .embed_one(normalized.as_str(), InputType::Query)
            .await?;
        self.search_vector(&vector, k)
    }

    /// Rank rows against an already-embedded query.
    pub fn search_vector(&self, vector: &[f32], k: usize) -> Result<Vec<RetrievalResult>, DomainError> {
        if k == 0 {
            return Err(DomainError::InvalidInput("k must be greater than zero".into()));
        }
        if !self.index.is_empty() && vector.len() != self.index.dimension() {
            error!(
                expected = self.index.dimension(),
                actual = vector.len(),
                index_model = %self.index.model_id(),
                "Query embedding dimension does not match the index; embedding model and index are out of sync"
            );
            return Err(DomainError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: vector.len(),
            });
        }

        let hits = self.index.vectors().search(vector, k)?;
        hits.into_iter()
            .enumerate()
            .map(|(rank, hit)| {
                let row = self.index.table().get(hit.id).ok_or_else(|| {
                    DomainError::IndexCorrupt(format!("vector {} has no side-table row", hit.id))
                })?;
                Ok(RetrievalResult {
                    row: row.clone(),
                    score: hit.distance,
                    rank,
                })
            })
            .collect()
    }
}
