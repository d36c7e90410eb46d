//! # Rook
//!
//! An embedded HTTP/WebSocket server framework: an exact-path router over
//! static and WebSocket routes, plus per-connection session management
//! with one reader and one writer task per live connection.
//!
//! ## Modules
//!
//! - [`net`]: router, dispatcher, session, registry, controller trait
//! - [`server`]: axum hosting layer with graceful shutdown
//! - [`config`]: TOML configuration with env overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rook::net::{HttpRouter, RegistryConfig, SessionRegistry, WebSocketController};
//! use rook::config::ServerConfig;
//!
//! struct EchoController;
//!
//! #[async_trait::async_trait]
//! impl WebSocketController for EchoController {
//!     async fn on_message(
//!         &self,
//!         session: &rook::net::Session,
//!         message: &rook::net::Message,
//!     ) -> anyhow::Result<()> {
//!         session.send(message.text_content());
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = Arc::new(SessionRegistry::new(RegistryConfig::default()));
//!     let mut router = HttpRouter::new(Arc::clone(&registry));
//!     router.web_socket_route("/ws", Arc::new(EchoController));
//!
//!     rook::server::serve(router, registry, &ServerConfig::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod net;
pub mod server;

// Re-export top-level types for convenience
pub use config::{Config, ConfigError, LoggingConfig, ServerConfig};

pub use net::{
    HttpRouter, Message, MessageKind, NetError, RegistryConfig, RegistryError, Session,
    SessionRegistry, Transport, TransportError, WebSocketController, WebSocketDispatcher,
    WsTransport,
};

pub use server::{build_app, serve, ServerError};
