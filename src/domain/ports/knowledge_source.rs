use crate::domain::entities::knowledge_row::KnowledgeRecord;
use crate::domain::error::DomainError;

/// Where the builder reads raw knowledge records from.
pub trait KnowledgeSource: Send + Sync {
    fn load_records(&self) -> Result<Vec<KnowledgeRecord>, DomainError>;
}

impl KnowledgeSource for Vec<KnowledgeRecord> {
    fn load_records(&self) -> Result<Vec<KnowledgeRecord>, DomainError> {
        Ok(self.clone())
    }
}
