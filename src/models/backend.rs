use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::app::config::BackendConfig;
use crate::error::{Error, Result};
use crate::models::provider::{status_error, ProviderError, ReplyProvider};

/// Reply provider backed by a self-hosted chat endpoint.
///
/// `POST {base_url}{chat_path}` with `{"message": ...}`, answered by `{"reply": ...}`.
#[derive(Debug)]
pub struct BackendProvider {
    client: Client,
    endpoint: Url,
}

impl BackendProvider {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::platform(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = config.endpoint(&config.chat_path)?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ReplyProvider for BackendProvider {
    async fn reply(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&BackendChatRequest { message: prompt })
            .send()
            .await?;

        if !response.status().is_success() {
            let err = status_error(response).await;
            warn!("Backend chat endpoint error: {}", err);
            return Err(err);
        }

        let body: BackendChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("Failed to parse response: {}", e)))?;

        debug!("Received reply from backend chat endpoint");
        body.into_reply()
    }

    fn name(&self) -> &str {
        "backend"
    }
}

#[derive(Debug, Serialize)]
struct BackendChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct BackendChatResponse {
    reply: Option<String>,
    error: Option<String>,
}

impl BackendChatResponse {
    fn into_reply(self) -> std::result::Result<String, ProviderError> {
        match (self.reply, self.error) {
            (Some(reply), _) => Ok(reply),
            (None, Some(error)) => {
                Err(ProviderError::malformed(format!("backend error: {}", error)))
            }
            (None, None) => Err(ProviderError::malformed("response has no reply field")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers the first connection on an ephemeral port with a raw HTTP response.
    async fn serve_once(status_line: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 8192];
            let _ = socket.read(&mut request).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    fn provider_at(base_url: String) -> BackendProvider {
        BackendProvider::new(&BackendConfig {
            base_url,
            timeout_seconds: 5,
            ..BackendConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_path() {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:8000".to_string(),
            chat_path: "/chat".to_string(),
            ..BackendConfig::default()
        };
        let provider = BackendProvider::new(&config).unwrap();
        assert_eq!(provider.endpoint().as_str(), "http://127.0.0.1:8000/chat");
        assert_eq!(provider.name(), "backend");
    }

    #[test]
    fn test_endpoint_under_path_prefix() {
        let config = BackendConfig {
            base_url: "https://example.com/api/".to_string(),
            ..BackendConfig::default()
        };
        let provider = BackendProvider::new(&config).unwrap();
        assert_eq!(provider.endpoint().as_str(), "https://example.com/api/chat");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = BackendConfig {
            base_url: "not a url".to_string(),
            ..BackendConfig::default()
        };
        assert!(matches!(BackendProvider::new(&config), Err(Error::Url(_))));
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(BackendChatRequest { message: "cost?" }).unwrap();
        assert_eq!(body, json!({ "message": "cost?" }));
    }

    #[test]
    fn test_response_parsing() {
        let ok: BackendChatResponse =
            serde_json::from_value(json!({ "reply": "It depends." })).unwrap();
        assert_eq!(ok.into_reply().unwrap(), "It depends.");

        let failed: BackendChatResponse =
            serde_json::from_value(json!({ "error": "API keys are not set." })).unwrap();
        let err = failed.into_reply().unwrap_err();
        assert!(err.to_string().contains("API keys are not set."));

        let empty: BackendChatResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.into_reply().unwrap_err().kind(), "malformed_payload");
    }

    #[tokio::test]
    async fn test_reply_from_local_server() {
        let base_url = serve_once("200 OK", r#"{"reply":"Validate demand first."}"#).await;
        let reply = provider_at(base_url).reply("where do I start?").await.unwrap();
        assert_eq!(reply, "Validate demand first.");
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_code_and_body() {
        let base_url = serve_once("503 Service Unavailable", "overloaded").await;
        let err = provider_at(base_url).reply("hi").await.unwrap_err();
        assert_eq!(err, ProviderError::status(503, "overloaded"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let err = provider_at("http://127.0.0.1:1".to_string())
            .reply("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)), "got {:?}", err);
    }
}
