pub mod hashing;
pub mod ollama;
pub mod openai;
pub mod voyage;

use crate::domain::error::DomainError;

/// Texts per request for the HTTP providers.
pub(crate) const BATCH_SIZE: usize = 32;

/// Map a non-2xx embedding response to an error, keeping the body for diagnosis.
pub(crate) async fn error_for_status(provider: &str, resp: reqwest::Response) -> DomainError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    DomainError::Embedding(format!("{provider} API {status}: {body}"))
}
