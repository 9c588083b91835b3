use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Maps a single user utterance to a single textual reply.
///
/// Implementations hold their own credentials and transport settings; they are
/// built once from configuration and shared by every session that uses them.
#[async_trait]
pub trait ReplyProvider: Send + Sync {
    async fn reply(&self, prompt: &str) -> std::result::Result<String, ProviderError>;
    fn name(&self) -> &str;
}

/// Why a provider call failed.
///
/// The chat session shows one generic notice for all of these, but keeps the
/// variant around so logs can tell an unreachable host from a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider payload: {0}")]
    MalformedPayload(String),

    #[error("no credentials configured for provider {provider}")]
    MissingCredentials { provider: String },
}

impl ProviderError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        ProviderError::Status {
            status,
            body: body.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        ProviderError::MalformedPayload(msg.into())
    }

    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Network(_) => "network",
            ProviderError::Timeout => "timeout",
            ProviderError::Status { .. } => "status",
            ProviderError::MalformedPayload(_) => "malformed_payload",
            ProviderError::MissingCredentials { .. } => "missing_credentials",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::MalformedPayload(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::status(status.as_u16(), err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Reads a non-success response into a `Status` error, keeping whatever body
/// the provider sent back.
pub(crate) async fn status_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    ProviderError::status(status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ProviderError::Timeout.kind(), "timeout");
        assert_eq!(ProviderError::Network("refused".into()).kind(), "network");
        assert_eq!(ProviderError::status(502, "bad gateway").kind(), "status");
        assert_eq!(ProviderError::malformed("no text").kind(), "malformed_payload");
    }

    #[test]
    fn test_status_display() {
        let err = ProviderError::status(429, "quota exceeded");
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("quota exceeded"));
    }
}
