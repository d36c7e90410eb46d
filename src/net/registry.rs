//! Session Registry
//!
//! Process-wide map of all open WebSocket sessions, keyed by session ID.
//! Every operation is serialized by a single lock so that creation, lookup,
//! removal and shutdown never race. The registry is constructed explicitly
//! by the hosting process and shared by `Arc`; there is no global instance.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use super::controller::WebSocketController;
use super::session::Session;
use super::transport::Transport;

/// Configuration for the session registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum number of concurrently open sessions
    pub max_sessions: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { max_sessions: 1000 }
    }
}

/// Errors that can occur in the session registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("too many open sessions (limit: {0})")]
    TooManySessions(usize),
}

/// Thread-safe map from session ID to open session.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
    config: RegistryConfig,
}

impl SessionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Create a new session around the given transport and register it
    /// under a fresh unique ID.
    ///
    /// The session's tasks are not yet running; the dispatcher starts them.
    pub async fn create_session(
        &self,
        transport: Box<dyn Transport>,
        controller: Arc<dyn WebSocketController>,
    ) -> Result<Arc<Session>, RegistryError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.len() >= self.config.max_sessions {
            return Err(RegistryError::TooManySessions(self.config.max_sessions));
        }
        let session = Session::new(transport, controller);
        sessions.insert(session.id().to_owned(), Arc::clone(&session));
        tracing::debug!(session_id = %session.id(), "session created");
        Ok(session)
    }

    /// Look up a session by its ID. Unknown IDs are not an error.
    pub async fn session_by(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.lock().await.get(id).cloned()
    }

    /// Remove a session from the registry.
    ///
    /// Returns whether the session was present. Idempotent: repeat calls
    /// report `false` after the first.
    pub async fn remove(&self, session: &Session) -> bool {
        let removed = self.sessions.lock().await.remove(session.id()).is_some();
        if removed {
            tracing::debug!(session_id = %session.id(), "session removed");
        }
        removed
    }

    /// Close every registered session and drain the map.
    ///
    /// Runs under the registry lock for the whole iteration so no session
    /// can be created or removed concurrently. Safe against re-entry:
    /// `Session::close()` never takes the registry lock; disconnect-side
    /// removal runs later on the reader task and simply finds nothing left.
    pub async fn stop_all(&self) {
        let mut sessions = self.sessions.lock().await;
        for session in sessions.values() {
            session.close().await;
        }
        let count = sessions.len();
        sessions.clear();
        tracing::info!(sessions = count, "all sessions stopped");
    }

    /// Number of currently open sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::transport::mock::MockTransport;

    struct NoopController;

    impl WebSocketController for NoopController {}

    fn controller() -> Arc<dyn WebSocketController> {
        Arc::new(NoopController)
    }

    #[tokio::test]
    async fn test_create_lookup_remove() {
        let registry = SessionRegistry::new(RegistryConfig::default());
        let (transport, _peer) = MockTransport::channel();

        let session = registry
            .create_session(Box::new(transport), controller())
            .await
            .unwrap();
        assert!(!session.id().is_empty());
        assert_eq!(registry.session_count().await, 1);

        let found = registry.session_by(session.id()).await;
        assert!(found.is_some());
        assert_eq!(found.unwrap().id(), session.id());

        assert!(registry.remove(&session).await);
        assert!(!registry.remove(&session).await);
        assert!(registry.session_by(session.id()).await.is_none());
        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let registry = SessionRegistry::new(RegistryConfig::default());
        assert!(registry.session_by("no-such-session").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_creates_yield_distinct_ids() {
        let registry = Arc::new(SessionRegistry::new(RegistryConfig::default()));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let (transport, _peer) = MockTransport::channel();
                let session = registry
                    .create_session(Box::new(transport), controller())
                    .await
                    .unwrap();
                session.id().to_owned()
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 16);
        assert_eq!(registry.session_count().await, 16);

        for id in &ids {
            assert!(registry.session_by(id).await.is_some());
        }
    }

    #[tokio::test]
    async fn test_stop_all_closes_and_drains() {
        let registry = SessionRegistry::new(RegistryConfig::default());

        let mut sessions = Vec::new();
        for _ in 0..3 {
            let (transport, _peer) = MockTransport::channel();
            sessions.push(
                registry
                    .create_session(Box::new(transport), controller())
                    .await
                    .unwrap(),
            );
        }
        assert_eq!(registry.session_count().await, 3);

        registry.stop_all().await;

        for session in &sessions {
            assert!(session.is_closed());
            assert!(registry.session_by(session.id()).await.is_none());
        }
        assert_eq!(registry.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_session_limit() {
        let registry = SessionRegistry::new(RegistryConfig { max_sessions: 2 });

        for _ in 0..2 {
            let (transport, _peer) = MockTransport::channel();
            registry
                .create_session(Box::new(transport), controller())
                .await
                .unwrap();
        }

        let (transport, _peer) = MockTransport::channel();
        let result = registry.create_session(Box::new(transport), controller()).await;
        assert!(matches!(result, Err(RegistryError::TooManySessions(2))));
    }
}
