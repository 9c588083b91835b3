use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::provider::ProviderError;

pub const DEFAULT_FAILURE_NOTICE: &str = "Error fetching response.";

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Assistant,
}

/// A single entry in the conversation. Text is plain, already stripped of markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub origin: Origin,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(id: u64, origin: Origin, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            origin,
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.origin == Origin::User
    }
}

/// Snapshot of a chat session as the presentation layer sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
    pub pending: bool,
    pub last_failure: Option<ProviderError>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: Vec::new(),
            pending: false,
            last_failure: None,
        }
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn is_idle(&self) -> bool {
        !self.pending
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Options applied when a session is created
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub greeting: Option<String>,
    pub failure_notice: String,
}

impl SessionOptions {
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    pub fn with_failure_notice(mut self, notice: impl Into<String>) -> Self {
        self.failure_notice = notice.into();
        self
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            greeting: None,
            failure_notice: DEFAULT_FAILURE_NOTICE.to_string(),
        }
    }
}

/// Errors surfaced by `ChatSessionManager::send`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session is busy waiting for a reply")]
    SessionBusy,
}
