pub mod gemini;
pub mod openai_chat;
pub mod resilient;

use crate::domain::error::{DomainError, FailureKind};
use reqwest::StatusCode;

/// Sampling settings shared by the generator adapters. Short, low-temperature
/// replies suit a help-desk assistant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_output_tokens: 150,
            temperature: 0.3,
        }
    }
}

pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> DomainError {
    let kind = if e.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Network
    };
    DomainError::fallback(kind, format!("{provider} request failed: {e}"))
}

pub(crate) fn status_kind(status: StatusCode) -> FailureKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::Auth,
        StatusCode::TOO_MANY_REQUESTS => FailureKind::RateLimited,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => FailureKind::Timeout,
        s if s.is_server_error() => FailureKind::Network,
        _ => FailureKind::Malformed,
    }
}

pub(crate) async fn error_for_status(provider: &str, resp: reqwest::Response) -> DomainError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    DomainError::fallback(status_kind(status), format!("{provider} API {status}: {body}"))
}
