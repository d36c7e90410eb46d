//! WebSocket Message Type
//!
//! Defines the immutable value type exchanged over a session. A message
//! carries the logical content of one frame: regular text, or the payload
//! of a ping/pong control frame. Currently only text payloads are supported.

/// The logical kind of a WebSocket message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A regular text message
    Text,
    /// A ping control message
    Ping,
    /// A pong control message
    Pong,
}

/// One WebSocket message, immutable after construction.
///
/// Created by the reader task from an inbound frame, or by application
/// code via [`Session::send`](crate::net::Session::send). Consumed once
/// by the writer task, then discarded.
#[derive(Debug, Clone)]
pub struct Message {
    kind: MessageKind,
    payload: String,
}

impl Message {
    /// Create a text message with the given payload.
    pub fn text(payload: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Text,
            payload: payload.into(),
        }
    }

    /// Create a ping message with the given payload.
    pub fn ping(payload: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Ping,
            payload: payload.into(),
        }
    }

    /// Create a pong message with the given payload.
    pub fn pong(payload: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Pong,
            payload: payload.into(),
        }
    }

    /// The kind of this message.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// The text content of this message.
    pub fn text_content(&self) -> &str {
        &self.payload
    }

    /// Whether this is a regular text message.
    pub fn is_text(&self) -> bool {
        self.kind == MessageKind::Text
    }

    /// Whether this is a ping message.
    pub fn is_ping(&self) -> bool {
        self.kind == MessageKind::Ping
    }

    /// Whether this is a pong message.
    pub fn is_pong(&self) -> bool {
        self.kind == MessageKind::Pong
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_message() {
        let msg = Message::text("hello");
        assert_eq!(msg.kind(), MessageKind::Text);
        assert!(msg.is_text());
        assert!(!msg.is_ping());
        assert!(!msg.is_pong());
        assert_eq!(msg.text_content(), "hello");
    }

    #[test]
    fn test_ping_message() {
        let msg = Message::ping("x");
        assert!(msg.is_ping());
        assert!(!msg.is_text());
        assert!(!msg.is_pong());
        assert_eq!(msg.text_content(), "x");
    }

    #[test]
    fn test_pong_message() {
        let msg = Message::pong("");
        assert!(msg.is_pong());
        assert!(!msg.is_text());
        assert!(!msg.is_ping());
        assert!(msg.text_content().is_empty());
    }
}
