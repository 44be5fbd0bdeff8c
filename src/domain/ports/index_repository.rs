use crate::domain::entities::knowledge_index::KnowledgeIndex;
use crate::domain::error::DomainError;

/// Persists the vector index and its side table as one unit.
pub trait IndexRepository: Send + Sync {
    /// Replace any existing pair. Either both artifacts are replaced or neither is.
    fn save(&self, index: &KnowledgeIndex) -> Result<(), DomainError>;

    /// Load both artifacts. A missing half is [`DomainError::IndexArtifactMissing`].
    fn load(&self) -> Result<KnowledgeIndex, DomainError>;
}
