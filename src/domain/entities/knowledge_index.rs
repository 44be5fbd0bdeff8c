use crate::domain::entities::side_table::SideTable;
use crate::domain::entities::vector_index::VectorIndex;
use crate::domain::error::DomainError;
use std::collections::BTreeSet;

/// The vector index and its side table, always handled as one unit.
///
/// Construction checks that both halves describe exactly the same ids and
/// dimension, so a value of this type never holds a half-patched pair.
#[derive(Debug, Clone)]
pub struct KnowledgeIndex {
    vectors: VectorIndex,
    table: SideTable,
}

impl KnowledgeIndex {
    pub fn new(vectors: VectorIndex, table: SideTable) -> Result<Self, DomainError> {
        if table.header.dimension != vectors.dimension() {
            return Err(DomainError::IndexCorrupt(format!(
                "side table records dimension {} but vectors have {}",
                table.header.dimension,
                vectors.dimension()
            )));
        }
        if table.header.row_count != table.len() {
            return Err(DomainError::IndexCorrupt(format!(
                "side table header says {} rows but holds {}",
                table.header.row_count,
                table.len()
            )));
        }

        let vector_ids: BTreeSet<u64> = vectors.ids().iter().copied().collect();
        let row_ids: BTreeSet<u64> = table.rows().iter().map(|r| r.id).collect();
        if vector_ids != row_ids {
            let missing_rows = vector_ids.difference(&row_ids).count();
            let missing_vectors = row_ids.difference(&vector_ids).count();
            return Err(DomainError::IndexCorrupt(format!(
                "{missing_rows} vector(s) without a row, {missing_vectors} row(s) without a vector"
            )));
        }

        Ok(Self { vectors, table })
    }

    pub fn vectors(&self) -> &VectorIndex {
        &self.vectors
    }

    pub fn table(&self) -> &SideTable {
        &self.table
    }

    pub fn model_id(&self) -> &str {
        &self.table.header.model_id
    }

    pub fn dimension(&self) -> usize {
        self.vectors.dimension()
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
