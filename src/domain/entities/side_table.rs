use crate::domain::entities::knowledge_row::KnowledgeRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Describes how the paired vector artifact was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHeader {
    /// Embedding model the vectors came from. Queries must use the same model.
    pub model_id: String,
    pub dimension: usize,
    pub metric: String,
    pub row_count: usize,
    pub built_at: DateTime<Utc>,
}

/// Maps vector id back to the knowledge row it was embedded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideTable {
    pub header: IndexHeader,
    rows: Vec<KnowledgeRow>,
}

impl SideTable {
    /// Rows are kept sorted by id for lookup.
    pub fn new(header: IndexHeader, mut rows: Vec<KnowledgeRow>) -> Self {
        rows.sort_by_key(|r| r.id);
        Self { header, rows }
    }

    pub fn get(&self, id: u64) -> Option<&KnowledgeRow> {
        self.rows
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|pos| &self.rows[pos])
    }

    pub fn rows(&self) -> &[KnowledgeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
