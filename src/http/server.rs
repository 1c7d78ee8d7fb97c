//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Expose `/update` only when a webhook secret is configured
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::handlers;
use crate::lifecycle::ShutdownSignal;
use crate::store::ConfigStore;
use crate::webhook::WebhookAuth;

/// Largest accepted request body. Webhook payloads are the biggest we see.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ConfigStore>,
    /// `None` when no secret is configured; `/update` is then not routed.
    pub webhook: Option<Arc<WebhookAuth>>,
}

/// HTTP front end of the configuration server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over an already bootstrapped store.
    pub fn new(config: &ServerConfig, store: Arc<ConfigStore>, webhook: Option<WebhookAuth>) -> Self {
        if webhook.is_none() {
            tracing::warn!("No webhook secret configured, /update is disabled");
        }

        let state = AppState {
            store,
            webhook: webhook.map(Arc::new),
        };

        let router = Self::build_router(Duration::from_secs(config.timeouts.request_secs), state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(request_timeout: Duration, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", post(handlers::resolve_config))
            .route("/healthz", get(handlers::health));

        if state.webhook.is_some() {
            router = router.route("/update", post(handlers::trigger_refresh));
        }

        router
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for serving on a custom transport.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.wait().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
