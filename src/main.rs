//! Pipeline configuration server (v1)
//!
//! Answers the CI server's "which pipeline configuration does this repository
//! use?" with a file from a mirrored configuration repository, or `204` so
//! the repository's own file applies.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │              CONFIGURATION SERVER                │
//!                       │                                                  │
//!   POST / ─────────────┼─▶ http::handlers ──▶ store.resolve ──▶ file read │
//!                       │                          │                       │
//!                       │                   ArcSwap<Snapshot>              │
//!                       │                          ▲                       │
//!   POST /update ───────┼─▶ webhook::verify ──▶ store.refresh              │
//!                       │                  mirror.sync → index::load       │
//!                       │                          │                       │
//!                       └──────────────────────────┼───────────────────────┘
//!                                                  ▼
//!                                       upstream config repository (git)
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use pipeline_config_server::config::loader::load_from_env;
use pipeline_config_server::config::schema::LogFormat;
use pipeline_config_server::lifecycle::{self, signals, Shutdown, Started};
use pipeline_config_server::mirror::GitMirror;
use pipeline_config_server::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_from_env() {
        Ok(config) => config,
        Err(e) => {
            logging::init(LogFormat::default());
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    logging::init(config.observability.log_format);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pipeline-config-server starting");

    let mirror = GitMirror::new(config.repository.url.clone(), config.repository.data_folder.clone());
    tracing::info!(
        repository = %mirror.display_url(),
        data_folder = %config.repository.data_folder.display(),
        webhook_enabled = config.webhook.enabled(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let Started { server, listener, .. } = match lifecycle::start(&config, Arc::new(mirror)).await {
        Ok(started) => started,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_shutdown_signal().await;
        trigger.trigger();
    });

    if let Err(e) = server.run(listener, server_shutdown).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
