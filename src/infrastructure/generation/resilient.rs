use crate::domain::error::{DomainError, FailureKind};
use crate::domain::ports::generation_port::TextGenerator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounds every generator call with a timeout and retries transient failures once.
///
/// Auth, quota and malformed-response failures are returned immediately;
/// only network errors and timeouts get the retry.
pub struct ResilientGenerator {
    inner: Arc<dyn TextGenerator>,
    timeout: Duration,
    retries: u32,
}

impl ResilientGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            retries: 1,
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    async fn attempt(&self, prompt: &str) -> Result<String, DomainError> {
        match tokio::time::timeout(self.timeout, self.inner.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::fallback(
                FailureKind::Timeout,
                format!("{} did not answer within {:?}", self.inner.name(), self.timeout),
            )),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for ResilientGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        let mut attempt = 0;
        loop {
            match self.attempt(prompt).await {
                Ok(text) => return Ok(text),
                Err(DomainError::FallbackUnavailable { kind, message })
                    if kind.is_transient() && attempt < self.retries =>
                {
                    attempt += 1;
                    warn!(
                        generator = self.inner.name(),
                        %kind,
                        error = %message,
                        attempt,
                        "Transient generator failure, retrying"
                    );
                }
                Err(e @ DomainError::FallbackUnavailable { .. }) => {
                    debug!(generator = self.inner.name(), error = %e, "Generator failed");
                    return Err(e);
                }
                Err(other) => {
                    return Err(DomainError::fallback(FailureKind::Network, other.to_string()));
                }
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
