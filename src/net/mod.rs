//! Embedded HTTP/WebSocket Server Core
//!
//! The framework half of this crate: an exact-path HTTP router with
//! static and WebSocket routes, and the per-connection session machinery
//! driving application callbacks.
//!
//! ## Architecture
//!
//! - **HttpRouter**: static route table, one handler or upgrade dispatch
//!   per exact path, fixed 404 for everything else
//! - **WebSocketDispatcher**: turns an accepted upgrade into a running
//!   session bound to one controller
//! - **Session / SessionRegistry**: handle and process-wide map of live
//!   connections; `stop_all` closes everything at shutdown
//! - **Reader / writer tasks**: one of each per session; the reader drives
//!   controller callbacks, the writer drains an ordered outgoing queue
//! - **WebSocketController**: the application-facing callback trait
//!
//! The transport itself (sockets, handshake, frame codec) stays with axum
//! behind the [`Transport`] seam.

mod controller;
mod dispatcher;
mod error;
mod message;
mod reader;
mod registry;
mod router;
mod session;
mod transport;
mod writer;

pub use controller::WebSocketController;
pub use dispatcher::WebSocketDispatcher;
pub use error::NetError;
pub use message::{Message, MessageKind};
pub use registry::{RegistryConfig, RegistryError, SessionRegistry};
pub use router::HttpRouter;
pub use session::Session;
pub use transport::{Frame, FrameReceiver, FrameSender, Transport, TransportError, WsTransport};
