//! Rook Demo Server
//!
//! Serves a JSON status route and a WebSocket route whose controller
//! replies to every text message with its reverse.
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! - `--config <path>`: TOML config file (default: `<config dir>/rook/config.toml`)
//! - `--port <port>`: override the configured port
//! - `ROOK_HOST` / `ROOK_PORT` / `ROOK_LOG`: environment overrides
//! - `RUST_LOG`: tracing filter (default: info)

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::IntoResponse;
use axum::Json;
use clap::Parser;
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rook::config::Config;
use rook::net::{
    HttpRouter, Message, RegistryConfig, Session, SessionRegistry, WebSocketController,
};

#[derive(Parser)]
#[command(name = "rook", version, about = "Embedded HTTP/WebSocket demo server")]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured port
    #[arg(long)]
    port: Option<u16>,
}

/// Replies to every text message with the reversed text.
struct ReverseController;

#[async_trait]
impl WebSocketController for ReverseController {
    async fn on_connect(&self, session: &Session) -> anyhow::Result<()> {
        tracing::info!(session_id = %session.id(), "web socket connected");
        Ok(())
    }

    async fn on_disconnect(&self, session: &Session) -> anyhow::Result<()> {
        tracing::info!(session_id = %session.id(), "web socket disconnected");
        Ok(())
    }

    async fn on_message(&self, session: &Session, message: &Message) -> anyhow::Result<()> {
        let reversed: String = message.text_content().chars().rev().collect();
        session.send(reversed);
        Ok(())
    }

    async fn on_error(
        &self,
        session: &Session,
        error: &rook::net::TransportError,
    ) -> anyhow::Result<()> {
        tracing::warn!(session_id = %session.id(), error = %error, "web socket error");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rook={},tower_http=debug", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting rook server v{}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(SessionRegistry::new(RegistryConfig {
        max_sessions: config.server.max_sessions,
    }));

    let mut router = HttpRouter::new(Arc::clone(&registry));

    router.static_route("/index", |_req| async {
        Ok(Json(json!({
            "service": "rook",
            "version": env!("CARGO_PKG_VERSION"),
        }))
        .into_response())
    });

    let status_registry = Arc::clone(&registry);
    router.static_route("/status", move |_req| {
        let registry = Arc::clone(&status_registry);
        async move {
            Ok(Json(json!({
                "open_sessions": registry.session_count().await,
            }))
            .into_response())
        }
    });

    router.web_socket_route("/ws", Arc::new(ReverseController));

    rook::server::serve(router, registry, &config.server).await?;

    Ok(())
}
