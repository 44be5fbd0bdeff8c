use crate::domain::error::DomainError;

/// Remote text completion used as the fallback answer source.
///
/// Implementations map every transport, auth, quota and payload problem to
/// [`DomainError::FallbackUnavailable`].
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError>;

    fn name(&self) -> &str;
}
