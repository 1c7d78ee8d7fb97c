//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter (when configured)
//! - Build the webhook authenticator
//! - Sync the mirror and load the index before anything is served
//! - Bind the listener last, so traffic only arrives once ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::io;
use std::sync::Arc;

use axum::http::header::InvalidHeaderName;
use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::mirror::Mirror;
use crate::observability::metrics;
use crate::store::{ConfigStore, RefreshError};
use crate::webhook::WebhookAuth;

/// Error that prevents the server from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid signature header: {0}")]
    SignatureHeader(#[from] InvalidHeaderName),

    #[error("metrics exporter failed to start: {0}")]
    Metrics(#[from] BuildError),

    #[error("initial sync failed: {0}")]
    Bootstrap(#[from] RefreshError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
}

/// Everything `main` needs to start serving.
pub struct Started {
    pub server: HttpServer,
    pub listener: TcpListener,
    pub store: Arc<ConfigStore>,
}

/// Bring up every subsystem in dependency order.
pub async fn start(config: &ServerConfig, mirror: Arc<dyn Mirror>) -> Result<Started, StartupError> {
    // 1. Metrics exporter
    if let Some(addr) = config.observability.metrics_address {
        metrics::init_metrics(addr)?;
    }

    // 2. Webhook authenticator
    let webhook = WebhookAuth::from_config(&config.webhook)?;

    // 3. Initial sync + index load
    tracing::info!(path = %mirror.root().display(), "Performing initial sync");
    let store = Arc::new(ConfigStore::bootstrap(mirror).await?);

    // 4. Listener
    let address = config.listener.socket_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let server = HttpServer::new(config, Arc::clone(&store), webhook);
    Ok(Started {
        server,
        listener,
        store,
    })
}
