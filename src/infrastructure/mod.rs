pub mod embeddings;
pub mod generation;
pub mod knowledge;
pub mod sqlite;

use crate::domain::error::DomainError;
use std::time::Duration;

/// HTTP client with a request timeout. Failing to build one (TLS backend
/// unavailable, for example) is a configuration error, not a reason to run without a timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, DomainError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DomainError::Config(format!("cannot build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_builds_with_timeout() {
        assert!(http_client(Duration::from_secs(5)).is_ok());
    }
}
