//! Transport Seam
//!
//! Abstracts the bidirectional WebSocket channel a session runs on. The
//! session machinery only ever consumes three operations: receive a frame
//! (blocking), send a frame, and shut the channel down. Frame encoding,
//! the upgrade handshake and the TCP/TLS socket itself stay with the
//! collaborator (axum).

use async_trait::async_trait;
use axum::extract::ws::{self, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;

use super::message::{Message, MessageKind};

/// One inbound frame, already classified by opcode.
///
/// This is the crate's only wire-adjacent contract: text, ping, pong, and
/// the terminal close frame.
#[derive(Debug)]
pub enum Frame {
    /// A text data frame
    Text(String),
    /// A ping control frame
    Ping(Vec<u8>),
    /// A pong control frame
    Pong(Vec<u8>),
    /// A close frame; the reader loop terminates on it
    Close,
}

/// Errors surfaced by the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Error from the underlying WebSocket
    #[error("websocket error: {0}")]
    WebSocket(#[from] axum::Error),

    /// The channel was closed before the operation completed
    #[error("transport closed")]
    Closed,
}

/// Receiving half of a session transport.
#[async_trait]
pub trait FrameReceiver: Send + 'static {
    /// Block until one frame is available.
    ///
    /// Returns `Ok(None)` when the peer closed the connection without a
    /// close frame (EOF).
    async fn receive(&mut self) -> Result<Option<Frame>, TransportError>;
}

/// Sending half of a session transport.
#[async_trait]
pub trait FrameSender: Send + 'static {
    /// Write one message as a single frame.
    async fn send(&mut self, message: &Message) -> Result<(), TransportError>;

    /// Shut down the channel, ending any blocked receive on the other half.
    async fn shutdown(&mut self) -> Result<(), TransportError>;
}

/// A bidirectional channel exclusively owned by one session.
pub trait Transport: Send + 'static {
    /// Split into independent receiving and sending halves, one per task.
    fn split(self: Box<Self>) -> (Box<dyn FrameReceiver>, Box<dyn FrameSender>);
}

/// Transport adapter over an upgraded axum WebSocket.
pub struct WsTransport {
    socket: WebSocket,
}

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl Transport for WsTransport {
    fn split(self: Box<Self>) -> (Box<dyn FrameReceiver>, Box<dyn FrameSender>) {
        let (sink, stream) = self.socket.split();
        (
            Box::new(WsFrameReceiver { stream }),
            Box::new(WsFrameSender { sink }),
        )
    }
}

struct WsFrameReceiver {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl FrameReceiver for WsFrameReceiver {
    async fn receive(&mut self) -> Result<Option<Frame>, TransportError> {
        match self.stream.next().await {
            None => Ok(None),
            Some(Err(e)) => Err(TransportError::WebSocket(e)),
            Some(Ok(msg)) => Ok(Some(match msg {
                ws::Message::Text(text) => Frame::Text(text),
                // Binary payloads are carried as text content
                ws::Message::Binary(bytes) => {
                    Frame::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
                ws::Message::Ping(payload) => Frame::Ping(payload),
                ws::Message::Pong(payload) => Frame::Pong(payload),
                ws::Message::Close(_) => Frame::Close,
            })),
        }
    }
}

struct WsFrameSender {
    sink: SplitSink<WebSocket, ws::Message>,
}

#[async_trait]
impl FrameSender for WsFrameSender {
    async fn send(&mut self, message: &Message) -> Result<(), TransportError> {
        let frame = match message.kind() {
            MessageKind::Text => ws::Message::Text(message.text_content().to_owned()),
            MessageKind::Ping => ws::Message::Ping(message.text_content().as_bytes().to_vec()),
            MessageKind::Pong => ws::Message::Pong(message.text_content().as_bytes().to_vec()),
        };
        self.sink.send(frame).await?;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), TransportError> {
        self.sink.close().await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory transport for exercising sessions without a socket.

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use super::{Frame, FrameReceiver, FrameSender, Message, Transport, TransportError};

    /// Test-side handle to a [`MockTransport`].
    pub(crate) struct MockPeer {
        /// Frames the session's reader will receive; drop to simulate EOF
        pub frames: mpsc::UnboundedSender<Result<Frame, TransportError>>,
        /// Messages the session's writer sent, in write order
        pub written: mpsc::UnboundedReceiver<Message>,
        /// Set once the sending half has been shut down
        pub shutdown: Arc<AtomicBool>,
    }

    pub(crate) struct MockTransport {
        inbound: mpsc::UnboundedReceiver<Result<Frame, TransportError>>,
        outbound: mpsc::UnboundedSender<Message>,
        shutdown: Arc<AtomicBool>,
    }

    impl MockTransport {
        pub(crate) fn channel() -> (MockTransport, MockPeer) {
            let (frames_tx, frames_rx) = mpsc::unbounded_channel();
            let (written_tx, written_rx) = mpsc::unbounded_channel();
            let shutdown = Arc::new(AtomicBool::new(false));
            (
                MockTransport {
                    inbound: frames_rx,
                    outbound: written_tx,
                    shutdown: Arc::clone(&shutdown),
                },
                MockPeer {
                    frames: frames_tx,
                    written: written_rx,
                    shutdown,
                },
            )
        }
    }

    impl Transport for MockTransport {
        fn split(self: Box<Self>) -> (Box<dyn FrameReceiver>, Box<dyn FrameSender>) {
            (
                Box::new(MockReceiver {
                    inbound: self.inbound,
                }),
                Box::new(MockSender {
                    outbound: self.outbound,
                    shutdown: self.shutdown,
                }),
            )
        }
    }

    struct MockReceiver {
        inbound: mpsc::UnboundedReceiver<Result<Frame, TransportError>>,
    }

    #[async_trait]
    impl FrameReceiver for MockReceiver {
        async fn receive(&mut self) -> Result<Option<Frame>, TransportError> {
            match self.inbound.recv().await {
                None => Ok(None),
                Some(Ok(frame)) => Ok(Some(frame)),
                Some(Err(e)) => Err(e),
            }
        }
    }

    struct MockSender {
        outbound: mpsc::UnboundedSender<Message>,
        shutdown: Arc<AtomicBool>,
    }

    #[async_trait]
    impl FrameSender for MockSender {
        async fn send(&mut self, message: &Message) -> Result<(), TransportError> {
            self.outbound
                .send(message.clone())
                .map_err(|_| TransportError::Closed)
        }

        async fn shutdown(&mut self) -> Result<(), TransportError> {
            self.shutdown.store(true, Ordering::SeqCst);
            Ok(())
        }
    }
}

