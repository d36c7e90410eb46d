//! WebSocket Session
//!
//! A session is the handle to one live WebSocket connection. It owns the
//! underlying transport exclusively, a reader task and a writer task, and
//! it dispatches the controller callbacks driven by the reader. Sessions
//! are created through the [`SessionRegistry`](super::registry::SessionRegistry)
//! and started by the route's dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use super::controller::WebSocketController;
use super::error::NetError;
use super::message::{Message, MessageKind};
use super::reader;
use super::registry::SessionRegistry;
use super::transport::{FrameReceiver, FrameSender, Transport, TransportError};
use super::writer::SessionWriter;

/// One established WebSocket connection.
pub struct Session {
    id: String,
    open: AtomicBool,
    controller: Arc<dyn WebSocketController>,
    writer: SessionWriter,
    cancel: Notify,
    // Transport halves held between construction and start()
    receiver: Mutex<Option<Box<dyn FrameReceiver>>>,
    sender: Mutex<Option<Box<dyn FrameSender>>>,
}

impl Session {
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        controller: Arc<dyn WebSocketController>,
    ) -> Arc<Self> {
        let (receiver, sender) = transport.split();
        Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            open: AtomicBool::new(true),
            controller,
            writer: SessionWriter::new(),
            cancel: Notify::new(),
            receiver: Mutex::new(Some(receiver)),
            sender: Mutex::new(Some(sender)),
        })
    }

    /// The unique identifier of this session.
    ///
    /// Unique among currently open sessions; generated as a random UUID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this session has been closed.
    ///
    /// Safe for concurrent reads from any task.
    pub fn is_closed(&self) -> bool {
        !self.open.load(Ordering::SeqCst)
    }

    /// Send a text message to the peer.
    ///
    /// Best-effort: the message is enqueued for the writer task and written
    /// in FIFO order relative to other sends. Sends on a closed session are
    /// silently dropped; callers must not assume delivery confirmation.
    pub fn send(&self, text: impl Into<String>) {
        self.send_message(Message::text(text));
    }

    /// Send an arbitrary message (text, ping or pong) to the peer.
    pub fn send_message(&self, message: Message) {
        if self.open.load(Ordering::SeqCst) {
            self.writer.send(message);
        }
    }

    /// Close this session. Idempotent.
    ///
    /// The first call stops the writer task (draining up to the cancel
    /// sentinel, shutting down the transport) and then signals the reader
    /// task to stop; the reader's blocking receive returns once the
    /// transport is gone. Removal from the registry is not performed here;
    /// it happens in the reader's disconnect cleanup, so `close()` never
    /// takes the registry lock.
    pub async fn close(&self) {
        if !self.open.swap(false, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(session_id = %self.id, "closing session");
        self.writer.stop().await;
        self.cancel.notify_one();
    }

    /// Start the reader and writer tasks. Called once by the dispatcher.
    pub(crate) async fn start(
        self: &Arc<Self>,
        registry: &Arc<SessionRegistry>,
    ) -> Result<(), NetError> {
        let sender = self
            .sender
            .lock()
            .await
            .take()
            .ok_or(NetError::AlreadyStarted)?;
        let receiver = self
            .receiver
            .lock()
            .await
            .take()
            .ok_or(NetError::AlreadyStarted)?;
        // Start order: writer before reader
        self.writer.start(sender, Arc::clone(self)).await?;
        let _reader = reader::spawn(Arc::clone(self), Arc::clone(registry), receiver);
        Ok(())
    }

    /// Wait until `close()` has requested the reader task to stop.
    pub(crate) async fn cancelled(&self) {
        self.cancel.notified().await;
    }

    /// Route an inbound message to exactly one controller callback.
    ///
    /// A callback error terminates that invocation only, never the reader.
    pub(crate) async fn process(&self, message: Message) {
        let result = match message.kind() {
            MessageKind::Ping => self.controller.on_ping(self, &message).await,
            MessageKind::Pong => self.controller.on_pong(self, &message).await,
            MessageKind::Text => self.controller.on_message(self, &message).await,
        };
        if let Err(e) = result {
            tracing::error!(
                session_id = %self.id,
                error = %e,
                "controller callback returned uncaught error"
            );
        }
    }

    /// Route a transport error to the controller's `on_error` callback.
    ///
    /// An error from `on_error` itself is logged and swallowed.
    pub(crate) async fn process_error(&self, error: &TransportError) {
        if let Err(e) = self.controller.on_error(self, error).await {
            tracing::error!(
                session_id = %self.id,
                error = %e,
                "on_error callback returned uncaught error"
            );
        }
    }

    /// Invoke the controller's `on_disconnect` callback.
    pub(crate) async fn dispatch_disconnect(&self) {
        if let Err(e) = self.controller.on_disconnect(self).await {
            tracing::error!(
                session_id = %self.id,
                error = %e,
                "on_disconnect callback returned uncaught error"
            );
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("open", &self.open.load(Ordering::SeqCst))
            .finish()
    }
}
