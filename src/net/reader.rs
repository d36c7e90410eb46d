//! Reader Task
//!
//! Each session owns one reader task blocking on inbound frames. Frames are
//! classified by opcode and forwarded to the controller through the session.
//! The loop ends when the peer sends a close frame, the connection hits EOF,
//! the transport errors, or `close()` signals a stop; it then runs the
//! disconnect cleanup: close the session, remove it from the registry and
//! invoke the controller's `on_disconnect`, in that order.

use std::sync::Arc;

use tokio::task::JoinHandle;

use super::message::Message;
use super::registry::SessionRegistry;
use super::session::Session;
use super::transport::{Frame, FrameReceiver};

pub(crate) fn spawn(
    session: Arc<Session>,
    registry: Arc<SessionRegistry>,
    receiver: Box<dyn FrameReceiver>,
) -> JoinHandle<()> {
    tokio::spawn(reader_loop(session, registry, receiver))
}

async fn reader_loop(
    session: Arc<Session>,
    registry: Arc<SessionRegistry>,
    mut receiver: Box<dyn FrameReceiver>,
) {
    loop {
        tokio::select! {
            _ = session.cancelled() => {
                tracing::debug!(session_id = %session.id(), "reader stop requested");
                break;
            }
            result = receiver.receive() => match result {
                Ok(Some(Frame::Text(text))) => {
                    session.process(Message::text(text)).await;
                }
                Ok(Some(Frame::Ping(payload))) => {
                    session
                        .process(Message::ping(String::from_utf8_lossy(&payload).into_owned()))
                        .await;
                }
                Ok(Some(Frame::Pong(payload))) => {
                    session
                        .process(Message::pong(String::from_utf8_lossy(&payload).into_owned()))
                        .await;
                }
                Ok(Some(Frame::Close)) => {
                    tracing::debug!(
                        session_id = %session.id(),
                        "connection closed by peer"
                    );
                    break;
                }
                Ok(None) => {
                    tracing::debug!(
                        session_id = %session.id(),
                        "connection closed by peer without close frame"
                    );
                    break;
                }
                Err(e) => {
                    // Connection-ending for reads
                    session.process_error(&e).await;
                    break;
                }
            }
        }
    }

    // Disconnect cleanup. Each step is isolated so a controller failure
    // cannot prevent registry removal.
    session.close().await;
    registry.remove(&session).await;
    session.dispatch_disconnect().await;
    tracing::debug!(session_id = %session.id(), "reader task terminating");
}
