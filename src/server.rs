//! Hosting Layer
//!
//! Mounts an [`HttpRouter`](crate::net::HttpRouter) as an axum service,
//! binds the listener and runs until a termination signal arrives. On
//! shutdown every open WebSocket session is stopped through the registry
//! before the server exits, so both per-session tasks end deterministically.

use std::sync::Arc;

use axum::extract::Request;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::net::{HttpRouter, SessionRegistry};

/// Errors raised by the hosting layer
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server error: {0}")]
    Internal(String),
}

/// Wrap the route table as an axum application.
///
/// Every request falls through to [`HttpRouter::route`]; axum's own path
/// matching is not used, so the router's exact-match semantics (including
/// its fixed 404) apply to the whole URI space.
pub fn build_app(router: HttpRouter) -> axum::Router {
    let router = Arc::new(router);
    axum::Router::new()
        .fallback(move |request: Request| {
            let router = Arc::clone(&router);
            async move { router.route(request).await }
        })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Run the server until ctrl-c or SIGTERM.
pub async fn serve(
    router: HttpRouter,
    registry: Arc<SessionRegistry>,
    config: &ServerConfig,
) -> Result<(), ServerError> {
    let app = build_app(router);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);

    // Stop all sessions as part of the shutdown signal so blocked reads
    // return and the connections can drain
    let shutdown = {
        let registry = Arc::clone(&registry);
        async move {
            shutdown_signal().await;
            tracing::info!("shutdown requested, stopping sessions");
            registry.stop_all().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install signal handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
