//! WebSocket Controller
//!
//! The application-facing callback set for a WebSocket route. Every method
//! has a default no-op implementation, so controllers only implement the
//! callbacks they care about. Callback errors are caught and logged at the
//! call site; they never propagate into the session machinery and never
//! terminate a reader or writer task.

use async_trait::async_trait;

use super::message::Message;
use super::session::Session;
use super::transport::TransportError;

/// Callbacks invoked over the lifetime of a WebSocket session.
#[async_trait]
pub trait WebSocketController: Send + Sync + 'static {
    /// Called once after a session has been established and its tasks started.
    async fn on_connect(&self, _session: &Session) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once during disconnect cleanup, after the session has been
    /// closed and removed from the registry.
    async fn on_disconnect(&self, _session: &Session) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called for every inbound text message.
    async fn on_message(&self, _session: &Session, _message: &Message) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called for every inbound ping frame.
    async fn on_ping(&self, _session: &Session, _message: &Message) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called for every inbound pong frame.
    async fn on_pong(&self, _session: &Session, _message: &Message) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called when the transport reports an error. Connection-ending for
    /// reads, non-fatal for individual writes.
    async fn on_error(&self, _session: &Session, _error: &TransportError) -> anyhow::Result<()> {
        Ok(())
    }
}
