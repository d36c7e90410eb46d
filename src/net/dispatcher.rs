//! WebSocket Dispatcher
//!
//! Bridges an accepted upgrade into a running session: one dispatcher is
//! instantiated per WebSocket route, bound to that route's controller. It
//! creates the session through the registry, starts the reader and writer
//! tasks and invokes the controller's `on_connect`. A failure at any step
//! abandons the dispatch without leaving a partial session registered.

use std::sync::Arc;

use super::controller::WebSocketController;
use super::registry::SessionRegistry;
use super::transport::Transport;

pub struct WebSocketDispatcher {
    registry: Arc<SessionRegistry>,
    controller: Arc<dyn WebSocketController>,
}

impl WebSocketDispatcher {
    pub fn new(registry: Arc<SessionRegistry>, controller: Arc<dyn WebSocketController>) -> Self {
        Self {
            registry,
            controller,
        }
    }

    /// Turn an upgraded transport into a live session.
    pub async fn dispatch(&self, transport: Box<dyn Transport>) {
        let session = match self
            .registry
            .create_session(transport, Arc::clone(&self.controller))
            .await
        {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "failed to dispatch web socket request");
                return;
            }
        };

        if let Err(e) = session.start(&self.registry).await {
            tracing::error!(
                session_id = %session.id(),
                error = %e,
                "failed to start session tasks"
            );
            session.close().await;
            self.registry.remove(&session).await;
            return;
        }

        if let Err(e) = self.controller.on_connect(&session).await {
            tracing::error!(
                session_id = %session.id(),
                error = %e,
                "on_connect callback returned uncaught error"
            );
        }
    }
}
