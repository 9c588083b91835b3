use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const API_KEY_SERVICE: &str = "launchpad.api_keys";

#[async_trait]
pub trait SecureStorage: Send + Sync {
    async fn store(&self, service: &str, key: &str, value: &str) -> Result<()>;
    async fn retrieve(&self, service: &str, key: &str) -> Result<Option<String>>;
    async fn delete(&self, service: &str, key: &str) -> Result<()>;
}

pub struct SecureStorageManager {
    backend: Box<dyn SecureStorage>,
}

impl SecureStorageManager {
    pub fn new() -> Result<Self> {
        Ok(Self::with_backend(Box::new(KeyringStorage)))
    }

    pub fn with_backend(backend: Box<dyn SecureStorage>) -> Self {
        Self { backend }
    }

    pub async fn store_api_key(&self, provider: &str, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(Error::validation("API key must not be empty"));
        }

        debug!("Storing API key for provider: {}", provider);
        let result = self.backend.store(API_KEY_SERVICE, provider, key).await;
        self.log_key_access("store", provider, result.is_ok());
        result
    }

    pub async fn retrieve_api_key(&self, provider: &str) -> Result<Option<String>> {
        debug!("Retrieving API key for provider: {}", provider);
        let result = self.backend.retrieve(API_KEY_SERVICE, provider).await;

        match &result {
            Ok(Some(_)) => self.log_key_access("retrieve", provider, true),
            Ok(None) => debug!("No API key found for provider: {}", provider),
            Err(_) => self.log_key_access("retrieve", provider, false),
        }

        result
    }

    pub async fn delete_api_key(&self, provider: &str) -> Result<()> {
        debug!("Deleting API key for provider: {}", provider);
        let result = self.backend.delete(API_KEY_SERVICE, provider).await;
        self.log_key_access("delete", provider, result.is_ok());
        result
    }

    fn log_key_access(&self, operation: &str, provider: &str, success: bool) {
        if success {
            debug!("Audit: {} operation successful for provider: {}", operation, provider);
        } else {
            warn!("Audit: {} operation failed for provider: {}", operation, provider);
        }
    }
}

/// OS credential store (Keychain, Credential Manager, kernel keyutils)
pub struct KeyringStorage;

#[async_trait]
impl SecureStorage for KeyringStorage {
    async fn store(&self, service: &str, key: &str, value: &str) -> Result<()> {
        let entry = Entry::new(service, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    async fn retrieve(&self, service: &str, key: &str) -> Result<Option<String>> {
        let entry = Entry::new(service, key)?;
        match entry.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::SecureStorage(e)),
        }
    }

    async fn delete(&self, service: &str, key: &str) -> Result<()> {
        let entry = Entry::new(service, key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(Error::SecureStorage(e)),
        }
    }
}
