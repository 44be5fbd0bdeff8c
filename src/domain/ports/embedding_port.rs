use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy)]
pub enum InputType {
    Document,
    Query,
}

/// Turns text into dense vectors.
///
/// The same provider, model and version must be used to build the index and
/// to embed queries. Nothing can detect a silent model swap from the vectors
/// alone, so the index records [`EmbeddingProvider::model_id`] and the
/// retriever warns when it differs.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// One vector per input text, in input order.
    async fn embed(&self, texts: &[String], input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError>;

    async fn embed_one(&self, text: &str, input_type: InputType) -> Result<Vec<f32>, DomainError> {
        let mut vectors = self.embed(&[text.to_string()], input_type).await?;
        match vectors.pop() {
            Some(v) if vectors.is_empty() => Ok(v),
            _ => Err(DomainError::Embedding(
                "provider did not return exactly one vector".into(),
            )),
        }
    }

    /// Declared output dimension, or 0 when only known after the first call.
    fn dimension(&self) -> usize;

    fn model_id(&self) -> &str;
}
