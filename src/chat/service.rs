use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::chat::format::strip_formatting;
use crate::chat::types::{Message, Origin, Session, SessionError, SessionOptions};
use crate::models::provider::{ProviderError, ReplyProvider};

/// Owns one chat session and mediates its exchanges with a reply provider.
///
/// A manager lives as long as the view that shows it. Only one provider call is
/// in flight at a time; a second `send` while waiting fails with
/// [`SessionError::SessionBusy`] instead of queueing.
pub struct ChatSessionManager {
    shared: Arc<SharedSession>,
    provider: Arc<dyn ReplyProvider>,
}

struct SharedSession {
    state: Mutex<SessionState>,
    updates: watch::Sender<Session>,
    failure_notice: String,
}

struct SessionState {
    session: Session,
    next_id: u64,
}

impl SessionState {
    fn append(&mut self, origin: Origin, text: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.session.messages.push(Message::new(id, origin, text));
        id
    }
}

impl SharedSession {
    /// Applies the provider outcome and returns the session to idle.
    fn settle(&self, outcome: Result<String, ProviderError>) {
        let mut state = self.state.lock();
        let session_id = state.session.id.clone();

        match outcome {
            Ok(raw) => {
                let id = state.append(Origin::Assistant, strip_formatting(&raw));
                state.session.last_failure = None;
                debug!(session = %session_id, message_id = id, "Appended assistant reply");
            }
            Err(err) => {
                warn!(
                    session = %session_id,
                    kind = err.kind(),
                    error = %err,
                    "Reply provider failed, showing failure notice"
                );
                state.append(Origin::Assistant, self.failure_notice.clone());
                state.session.last_failure = Some(err);
            }
        }

        state.session.pending = false;
        // Publish under the lock so subscribers never observe an older snapshot
        // after a newer one.
        self.updates.send_replace(state.session.clone());
    }
}

impl ChatSessionManager {
    /// Create a fresh session, seeded with the greeting as message 1 when one is given.
    pub fn initialize(provider: Arc<dyn ReplyProvider>, options: SessionOptions) -> Self {
        let mut state = SessionState {
            session: Session::new(),
            next_id: 1,
        };

        if let Some(greeting) = options.greeting {
            state.append(Origin::Assistant, greeting);
        }

        let (updates, _) = watch::channel(state.session.clone());
        info!(
            session = %state.session.id,
            provider = provider.name(),
            "Initialized chat session"
        );

        Self {
            shared: Arc::new(SharedSession {
                state: Mutex::new(state),
                updates,
                failure_notice: options.failure_notice,
            }),
            provider,
        }
    }

    /// Current snapshot of the session
    pub fn session(&self) -> Session {
        self.shared.state.lock().session.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.shared.state.lock().session.pending
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Receive every snapshot published after a state change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.shared.updates.subscribe()
    }

    /// Submit user text.
    ///
    /// Blank text is ignored and the unchanged snapshot is returned. Otherwise
    /// the user message is appended, the session turns pending, and the provider
    /// is called on a spawned task; the returned snapshot reflects only the user
    /// message. The assistant message arrives through [`subscribe`](Self::subscribe)
    /// once the provider settles, with a failure notice in place of the reply if
    /// the provider errored.
    ///
    /// Must be called from within a tokio runtime.
    pub fn send(&self, text: &str) -> Result<Session, SessionError> {
        if text.trim().is_empty() {
            debug!("Ignoring blank chat input");
            return Ok(self.session());
        }

        let snapshot = {
            let mut state = self.shared.state.lock();
            if state.session.pending {
                debug!(session = %state.session.id, "Rejecting send while a reply is pending");
                return Err(SessionError::SessionBusy);
            }

            let id = state.append(Origin::User, text.to_string());
            state.session.pending = true;
            debug!(session = %state.session.id, message_id = id, "Appended user message");

            let snapshot = state.session.clone();
            self.shared.updates.send_replace(snapshot.clone());
            snapshot
        };

        let shared: Weak<SharedSession> = Arc::downgrade(&self.shared);
        let provider = Arc::clone(&self.provider);
        let prompt = text.to_string();

        tokio::spawn(async move {
            let start_time = Instant::now();
            let outcome = provider.reply(&prompt).await;
            debug!(
                provider = provider.name(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                ok = outcome.is_ok(),
                "Reply provider settled"
            );

            match shared.upgrade() {
                Some(shared) => shared.settle(outcome),
                None => debug!("Session closed before the reply arrived, discarding it"),
            }
        });

        Ok(snapshot)
    }

    /// Wait until no reply is pending and return that snapshot.
    pub async fn settled(&self) -> Session {
        let mut updates = self.subscribe();
        let snapshot = match updates.wait_for(|session| !session.pending).await {
            Ok(session) => session.clone(),
            // The sender lives in `self`, so the channel cannot close while we wait.
            Err(_) => self.session(),
        };
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    use crate::app::config::BackendConfig;
    use crate::chat::types::DEFAULT_FAILURE_NOTICE;
    use crate::models::{BackendProvider, CannedProvider};

    struct FailingProvider;

    #[async_trait]
    impl ReplyProvider for FailingProvider {
        async fn reply(&self, _prompt: &str) -> Result<String, ProviderError> {
            Err(ProviderError::Network("connection refused".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    /// Holds every reply until the test releases it.
    struct GatedProvider {
        gate: Arc<Notify>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReplyProvider for GatedProvider {
        async fn reply(&self, prompt: &str) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(format!("echo: {}", prompt))
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    fn canned(reply: &str) -> Arc<dyn ReplyProvider> {
        Arc::new(CannedProvider::new(reply))
    }

    fn gated() -> (Arc<GatedProvider>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let provider = Arc::new(GatedProvider {
            gate: Arc::clone(&gate),
            calls: AtomicUsize::new(0),
        });
        (provider, gate)
    }

    #[tokio::test]
    async fn test_initialize_without_greeting() {
        let manager = ChatSessionManager::initialize(canned("ok"), SessionOptions::default());
        let session = manager.session();
        assert!(session.messages.is_empty());
        assert!(!session.pending);
    }

    #[tokio::test]
    async fn test_greeting_exchange_scenario() {
        let manager = ChatSessionManager::initialize(
            canned("It depends."),
            SessionOptions::default().with_greeting("Hi!"),
        );

        let initial = manager.session();
        assert_eq!(initial.messages.len(), 1);
        assert_eq!(initial.messages[0].id, 1);
        assert_eq!(initial.messages[0].origin, Origin::Assistant);
        assert_eq!(initial.messages[0].text, "Hi!");

        let after_send = manager.send("cost?").unwrap();
        assert!(after_send.pending);
        assert_eq!(after_send.messages.len(), 2);
        assert_eq!(after_send.messages[1].id, 2);
        assert_eq!(after_send.messages[1].origin, Origin::User);
        assert_eq!(after_send.messages[1].text, "cost?");

        let settled = manager.settled().await;
        assert!(!settled.pending);
        assert_eq!(settled.messages.len(), 3);
        assert_eq!(settled.messages[2].id, 3);
        assert_eq!(settled.messages[2].origin, Origin::Assistant);
        assert_eq!(settled.messages[2].text, "It depends.");
        assert!(settled.last_failure.is_none());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let manager = ChatSessionManager::initialize(canned("ok"), SessionOptions::default());

        for blank in ["", "   ", "\n\t"] {
            let session = manager.send(blank).unwrap();
            assert!(session.messages.is_empty());
            assert!(!session.pending);
        }
        assert!(manager.session().messages.is_empty());
    }

    #[tokio::test]
    async fn test_send_while_pending_is_busy() {
        let (provider, gate) = gated();
        let manager = ChatSessionManager::initialize(provider.clone(), SessionOptions::default());

        manager.send("first").unwrap();
        assert!(manager.is_pending());

        assert!(matches!(manager.send("second"), Err(SessionError::SessionBusy)));
        let session = manager.session();
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].text, "first");

        // Let the spawned call reach the gate before releasing it.
        while provider.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        gate.notify_one();

        let settled = manager.settled().await;
        assert_eq!(settled.messages.len(), 2);
        assert_eq!(settled.messages[1].text, "echo: first");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        // Usable again once idle.
        assert!(manager.send("third").is_ok());
    }

    #[tokio::test]
    async fn test_reply_formatting_is_stripped() {
        let manager =
            ChatSessionManager::initialize(canned("**Hello** #there"), SessionOptions::default());
        manager.send("hi").unwrap();
        let settled = manager.settled().await;
        assert_eq!(settled.messages[1].text, "Hello there");
    }

    #[tokio::test]
    async fn test_provider_failure_appends_notice() {
        let manager =
            ChatSessionManager::initialize(Arc::new(FailingProvider), SessionOptions::default());
        manager.send("hello").unwrap();

        let settled = manager.settled().await;
        assert!(!settled.pending);
        assert_eq!(settled.messages.len(), 2);
        assert_eq!(settled.messages[1].origin, Origin::Assistant);
        assert_eq!(settled.messages[1].text, DEFAULT_FAILURE_NOTICE);
        assert_eq!(
            settled.last_failure,
            Some(ProviderError::Network("connection refused".to_string()))
        );

        // The session stays usable after a failure.
        assert!(manager.send("again").is_ok());
        assert_eq!(manager.settled().await.messages.len(), 4);
    }

    #[tokio::test]
    async fn test_custom_failure_notice() {
        let options = SessionOptions::default().with_failure_notice("Assistant unavailable.");
        let manager = ChatSessionManager::initialize(Arc::new(FailingProvider), options);
        manager.send("hello").unwrap();
        assert_eq!(manager.settled().await.messages[1].text, "Assistant unavailable.");
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let manager = ChatSessionManager::initialize(
            canned("reply"),
            SessionOptions::default().with_greeting("Hello!"),
        );

        for round in 0..5 {
            manager.send(&format!("question {}", round)).unwrap();
            manager.settled().await;
        }

        let session = manager.session();
        assert_eq!(session.messages.len(), 11);
        let ids: Vec<u64> = session.messages.iter().map(|m| m.id).collect();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&11));
    }

    #[tokio::test]
    async fn test_each_exchange_adds_user_then_assistant() {
        let manager = ChatSessionManager::initialize(canned("ok"), SessionOptions::default());
        manager.send("one").unwrap();
        manager.settled().await;
        manager.send("two").unwrap();
        let session = manager.settled().await;

        let origins: Vec<Origin> = session.messages.iter().map(|m| m.origin).collect();
        assert_eq!(
            origins,
            vec![Origin::User, Origin::Assistant, Origin::User, Origin::Assistant]
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_pending_then_settled() {
        let (provider, gate) = gated();
        let manager = ChatSessionManager::initialize(provider.clone(), SessionOptions::default());
        let mut updates = manager.subscribe();

        manager.send("ping").unwrap();
        updates.changed().await.unwrap();
        {
            let snapshot = updates.borrow_and_update();
            assert!(snapshot.pending);
            assert_eq!(snapshot.messages.len(), 1);
        }

        while provider.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        gate.notify_one();

        updates.changed().await.unwrap();
        let snapshot = updates.borrow_and_update().clone();
        assert!(!snapshot.pending);
        assert_eq!(snapshot.messages[1].text, "echo: ping");
    }

    #[tokio::test]
    async fn test_reply_after_drop_is_discarded() {
        let (provider, gate) = gated();
        let manager = ChatSessionManager::initialize(provider.clone(), SessionOptions::default());
        let mut updates = manager.subscribe();

        manager.send("bye").unwrap();
        while provider.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        drop(manager);
        gate.notify_one();

        // With the manager gone the channel closes without a settled snapshot.
        updates.borrow_and_update();
        assert!(updates.changed().await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_backend_settles_with_network_failure() {
        let config = BackendConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_seconds: 5,
            ..BackendConfig::default()
        };
        let provider = Arc::new(BackendProvider::new(&config).unwrap());
        let manager = ChatSessionManager::initialize(provider, SessionOptions::default());

        manager.send("is anyone there?").unwrap();
        let session = manager.settled().await;

        assert!(!session.pending);
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[1].origin, Origin::Assistant);
        assert_eq!(session.messages[1].text, DEFAULT_FAILURE_NOTICE);
        assert!(
            matches!(session.last_failure, Some(ProviderError::Network(_))),
            "got {:?}",
            session.last_failure
        );
    }
}
