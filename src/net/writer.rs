//! Writer Task
//!
//! Each session owns one writer task draining an unbounded FIFO of outgoing
//! messages. Items are written to the transport one frame at a time in
//! submission order. A single in-band cancel sentinel ends the task; no
//! items enqueued after it are ever written.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::error::NetError;
use super::message::Message;
use super::session::Session;
use super::transport::FrameSender;

/// One entry of the outgoing queue: a real message, or the stop sentinel.
enum WriterItem {
    Message(Message),
    Cancel,
}

/// Owning handle for a session's writer task and its outgoing queue.
pub(crate) struct SessionWriter {
    queue: mpsc::UnboundedSender<WriterItem>,
    pending: Mutex<Option<mpsc::UnboundedReceiver<WriterItem>>>,
    running: Arc<AtomicBool>,
    stopping: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SessionWriter {
    pub(crate) fn new() -> Self {
        let (queue, pending) = mpsc::unbounded_channel();
        Self {
            queue,
            pending: Mutex::new(Some(pending)),
            running: Arc::new(AtomicBool::new(false)),
            stopping: AtomicBool::new(false),
            handle: Mutex::new(None),
        }
    }

    /// Spawn the writer task over the transport's sending half.
    pub(crate) async fn start(
        &self,
        sender: Box<dyn FrameSender>,
        session: Arc<Session>,
    ) -> Result<(), NetError> {
        let queue = self
            .pending
            .lock()
            .await
            .take()
            .ok_or(NetError::AlreadyStarted)?;
        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let handle = tokio::spawn(writer_loop(queue, sender, session, running));
        *self.handle.lock().await = Some(handle);
        Ok(())
    }

    /// Enqueue a message for delivery, best-effort.
    ///
    /// Messages submitted while the task is running are delivered in FIFO
    /// order. Once the task has stopped, sends are silently dropped.
    pub(crate) fn send(&self, message: Message) {
        if self.running.load(Ordering::SeqCst) && !self.stopping.load(Ordering::SeqCst) {
            let _ = self.queue.send(WriterItem::Message(message));
        }
    }

    /// Stop the writer task and wait for it to terminate.
    ///
    /// Enqueues exactly one cancel sentinel and joins the task. Idempotent.
    /// Must not be called from within the writer task itself.
    pub(crate) async fn stop(&self) {
        if self
            .stopping
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            let _ = self.queue.send(WriterItem::Cancel);
        }
        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.await {
                tracing::debug!(error = %e, "writer task join failed");
            }
        }
    }
}

async fn writer_loop(
    mut queue: mpsc::UnboundedReceiver<WriterItem>,
    mut sender: Box<dyn FrameSender>,
    session: Arc<Session>,
    running: Arc<AtomicBool>,
) {
    while let Some(item) = queue.recv().await {
        match item {
            WriterItem::Cancel => break,
            WriterItem::Message(message) => {
                // A failed send is reported but does not end the task
                if let Err(e) = sender.send(&message).await {
                    session.process_error(&e).await;
                }
            }
        }
    }
    if let Err(e) = sender.shutdown().await {
        tracing::debug!(
            session_id = %session.id(),
            error = %e,
            "transport shutdown failed"
        );
    }
    running.store(false, Ordering::SeqCst);
    tracing::debug!(session_id = %session.id(), "writer task terminating");
}
