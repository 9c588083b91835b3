use std::sync::Arc;
use tracing::{debug, info};

use crate::app::config::{AppConfig, ProviderKind};
use crate::chat::ChatSessionManager;
use crate::error::Result;
use crate::models::{
    BackendProvider, CannedProvider, GeminiProvider, ProviderError, ReplyProvider,
};
use crate::platform::SecureStorageManager;
use crate::resources::ResourceClient;

pub struct AppState {
    config: AppConfig,
    secure_storage: SecureStorageManager,
}

impl AppState {
    pub fn new(config: AppConfig, secure_storage: SecureStorageManager) -> Self {
        info!("Initializing application state");
        Self {
            config,
            secure_storage,
        }
    }

    pub fn get_config(&self) -> AppConfig {
        self.config.clone()
    }

    pub async fn get_api_key(&self, provider: &str) -> Result<Option<String>> {
        self.secure_storage.retrieve_api_key(provider).await
    }

    pub async fn set_api_key(&self, provider: &str, api_key: &str) -> Result<()> {
        self.secure_storage.store_api_key(provider, api_key).await
    }

    pub async fn remove_api_key(&self, provider: &str) -> Result<()> {
        self.secure_storage.delete_api_key(provider).await
    }

    /// Gemini key from the configured environment variable, falling back to the keyring.
    async fn resolve_gemini_key(&self, api_key_env: &str) -> Result<String> {
        if let Ok(key) = std::env::var(api_key_env) {
            if !key.trim().is_empty() {
                debug!("Using Gemini API key from ${}", api_key_env);
                return Ok(key);
            }
        }

        match self.get_api_key("gemini").await? {
            Some(key) => Ok(key),
            None => Err(ProviderError::MissingCredentials {
                provider: "gemini".to_string(),
            }
            .into()),
        }
    }

    /// Build the reply provider named in the config, or `kind` when given.
    pub async fn reply_provider(
        &self,
        kind: Option<ProviderKind>,
    ) -> Result<Arc<dyn ReplyProvider>> {
        let config = self.get_config();
        let kind = kind.unwrap_or(config.provider.kind);

        let provider: Arc<dyn ReplyProvider> = match kind {
            ProviderKind::Canned => Arc::new(CannedProvider::new(config.canned.reply.clone())),
            ProviderKind::Gemini => {
                let api_key = self.resolve_gemini_key(&config.gemini.api_key_env).await?;
                Arc::new(GeminiProvider::new(api_key, &config.gemini)?)
            }
            ProviderKind::Backend => Arc::new(BackendProvider::new(&config.backend)?),
        };

        info!("Using reply provider: {}", provider.name());
        Ok(provider)
    }

    /// A fresh chat session for one view, using the configured greeting and failure notice.
    pub fn chat_session(&self, provider: Arc<dyn ReplyProvider>) -> ChatSessionManager {
        ChatSessionManager::initialize(provider, self.get_config().to_session_options())
    }

    pub fn resource_client(&self) -> Result<ResourceClient> {
        ResourceClient::new(&self.get_config().backend)
    }
}
