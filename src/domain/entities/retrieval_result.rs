use crate::domain::entities::knowledge_row::KnowledgeRow;
use serde::Serialize;

/// One ranked hit for a query. Produced per query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub row: KnowledgeRow,
    /// Squared Euclidean distance to the query; lower is better.
    pub score: f32,
    /// 0-based position, best first.
    pub rank: usize,
}
