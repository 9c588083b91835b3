use async_trait::async_trait;

use crate::models::provider::{ProviderError, ReplyProvider};

pub const PLACEHOLDER_REPLY: &str =
    "This is a placeholder response. Connect to a backend to get real responses!";

/// Replies with the same text to every prompt. Useful offline and in demos.
#[derive(Debug, Clone)]
pub struct CannedProvider {
    reply: String,
}

impl CannedProvider {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for CannedProvider {
    fn default() -> Self {
        Self::new(PLACEHOLDER_REPLY)
    }
}

#[async_trait]
impl ReplyProvider for CannedProvider {
    async fn reply(&self, _prompt: &str) -> Result<String, ProviderError> {
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_reply_ignores_prompt() {
        let provider = CannedProvider::new("fixed");
        assert_eq!(provider.reply("anything").await.unwrap(), "fixed");
        assert_eq!(provider.reply("").await.unwrap(), "fixed");
    }

    #[tokio::test]
    async fn test_default_is_placeholder() {
        let provider = CannedProvider::default();
        assert_eq!(provider.reply("hi").await.unwrap(), PLACEHOLDER_REPLY);
        assert_eq!(provider.name(), "canned");
    }
}
