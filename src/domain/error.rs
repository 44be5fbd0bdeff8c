use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Why the generative fallback could not produce an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection refused, reset, DNS, or a 5xx from the provider.
    Network,
    /// The call did not finish within the configured timeout.
    Timeout,
    /// Rejected credentials (401/403).
    Auth,
    /// Quota or rate limit (429).
    RateLimited,
    /// The provider answered but the payload was unusable.
    Malformed,
    /// No generator is configured (e.g. missing API key).
    NotConfigured,
}

impl FailureKind {
    /// Transient failures are worth one retry; the rest will fail again.
    pub fn is_transient(self) -> bool {
        matches!(self, FailureKind::Network | FailureKind::Timeout)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Auth => write!(f, "auth"),
            FailureKind::RateLimited => write!(f, "rate-limited"),
            FailureKind::Malformed => write!(f, "malformed"),
            FailureKind::NotConfigured => write!(f, "not-configured"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Knowledge base has no usable rows to index")]
    EmptyKnowledgeBase,

    #[error("Embedding dimension mismatch: index has {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Index artifact missing: {}. Run `build` first", .0.display())]
    IndexArtifactMissing(PathBuf),

    #[error("Index artifacts are inconsistent: {0}")]
    IndexCorrupt(String),

    #[error("Fallback unavailable ({kind}): {message}")]
    FallbackUnavailable { kind: FailureKind, message: String },

    #[error("Knowledge store error: {0}")]
    KnowledgeStore(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DomainError {
    pub fn fallback(kind: FailureKind, message: impl Into<String>) -> Self {
        DomainError::FallbackUnavailable {
            kind,
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}
