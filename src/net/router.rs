//! HTTP Router
//!
//! Exact-path route table mapping a request's URI path to either a plain
//! handler or a WebSocket-upgrade dispatch. The table is built once before
//! serving begins and is read-only afterwards, so request handling needs no
//! locking. Unmatched paths receive a fixed 404 response.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{FromRequestParts, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::controller::WebSocketController;
use super::dispatcher::WebSocketDispatcher;
use super::registry::SessionRegistry;
use super::transport::WsTransport;

type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<Response>> + Send>>;
type StaticHandler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

enum Route {
    Static(StaticHandler),
    WebSocket(Arc<WebSocketDispatcher>),
}

/// Router over a static table of exact URI paths.
pub struct HttpRouter {
    routes: HashMap<String, Route>,
    registry: Arc<SessionRegistry>,
}

impl HttpRouter {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self {
            routes: HashMap::new(),
            registry,
        }
    }

    /// Register a plain handler for an exact path.
    ///
    /// Re-registering a path overwrites the previous handler; last write
    /// wins. A handler error surfaces as a generic error response and a
    /// server-side log entry.
    pub fn static_route<H, Fut>(&mut self, path: impl Into<String>, handler: H)
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
    {
        self.routes.insert(
            path.into(),
            Route::Static(Arc::new(move |request| Box::pin(handler(request)))),
        );
    }

    /// Register a WebSocket upgrade path served by the given controller.
    ///
    /// One dispatcher is instantiated per route and owns the binding to the
    /// controller for the router's lifetime.
    pub fn web_socket_route(
        &mut self,
        path: impl Into<String>,
        controller: Arc<dyn WebSocketController>,
    ) {
        let dispatcher = Arc::new(WebSocketDispatcher::new(
            Arc::clone(&self.registry),
            controller,
        ));
        self.routes.insert(path.into(), Route::WebSocket(dispatcher));
    }

    /// Route one inbound request to its registered handler.
    pub async fn route(&self, request: Request) -> Response {
        let path = request.uri().path().to_owned();
        match self.routes.get(&path) {
            None => self.error_404(),
            Some(Route::Static(handler)) => match handler(request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(
                        path = %path,
                        error = %e,
                        "unhandled error while processing server request"
                    );
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Error 500: Internal Server Error",
                    )
                        .into_response()
                }
            },
            Some(Route::WebSocket(dispatcher)) => {
                let (mut parts, _body) = request.into_parts();
                match WebSocketUpgrade::from_request_parts(&mut parts, &()).await {
                    Ok(upgrade) => {
                        let dispatcher = Arc::clone(dispatcher);
                        upgrade.on_upgrade(move |socket| async move {
                            dispatcher
                                .dispatch(Box::new(WsTransport::new(socket)))
                                .await;
                        })
                    }
                    Err(rejection) => rejection.into_response(),
                }
            }
        }
    }

    /// The fixed response for unmatched paths.
    pub fn error_404(&self) -> Response {
        (StatusCode::NOT_FOUND, "Error 404: Not Found").into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::{to_bytes, Body};

    use super::*;
    use crate::net::registry::RegistryConfig;

    fn registry() -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new(RegistryConfig::default()))
    }

    fn request(path: &str) -> Request {
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_registered_path_invokes_exactly_its_handler() {
        let mut router = HttpRouter::new(registry());

        let hits_a = Arc::new(AtomicUsize::new(0));
        let hits_b = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits_a);
        router.static_route("/a", move |_req| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok((StatusCode::OK, "a").into_response())
            }
        });

        let counter = Arc::clone(&hits_b);
        router.static_route("/b", move |_req| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok((StatusCode::OK, "b").into_response())
            }
        });

        let response = router.route(request("/a")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits_a.load(Ordering::SeqCst), 1);
        assert_eq!(hits_b.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unmatched_path_yields_fixed_404() {
        let mut router = HttpRouter::new(registry());
        router.static_route("/known", |_req| async {
            Ok(StatusCode::OK.into_response())
        });

        let response = router.route(request("/unknown")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_text(response).await;
        assert_eq!(body, "Error 404: Not Found");
    }

    #[tokio::test]
    async fn test_reregistering_path_overwrites() {
        let mut router = HttpRouter::new(registry());
        router.static_route("/dup", |_req| async {
            Ok((StatusCode::OK, "first").into_response())
        });
        router.static_route("/dup", |_req| async {
            Ok((StatusCode::OK, "second").into_response())
        });

        let response = router.route(request("/dup")).await;
        assert_eq!(body_text(response).await, "second");
    }

    #[tokio::test]
    async fn test_handler_error_yields_generic_500() {
        let mut router = HttpRouter::new(registry());
        router.static_route("/boom", |_req| async {
            anyhow::bail!("handler blew up")
        });

        let response = router.route(request("/boom")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn test_websocket_route_without_upgrade_is_rejected() {
        let mut router = HttpRouter::new(registry());

        struct NoopController;
        impl WebSocketController for NoopController {}

        router.web_socket_route("/ws", Arc::new(NoopController));

        // A plain GET without upgrade headers must not become a session
        let response = router.route(request("/ws")).await;
        assert_ne!(response.status(), StatusCode::OK);
    }
}
