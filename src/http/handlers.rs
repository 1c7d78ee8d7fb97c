//! Request handlers: configuration lookup, signed refresh, health probe.

use std::sync::Arc;
use std::time::UNIX_EPOCH;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde::Serialize;

use crate::http::request::{request_id, ConfigRequest};
use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::LookupOutcome;
use crate::webhook::AuthError;

/// `POST /`: return the registered configuration or tell the CI server to
/// use its default.
pub async fn resolve_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = request_id(&headers);

    let request = match ConfigRequest::parse(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Malformed configuration request");
            return response::status_error(StatusCode::BAD_REQUEST, format!("invalid request: {}", e));
        }
    };
    let url = request.repo.git_http_url;

    tracing::info!(request_id = %request_id, repo = %url, "Configuration requested");

    match state.store.resolve(&url).await {
        LookupOutcome::Found(content) => {
            tracing::info!(request_id = %request_id, repo = %url, "Serving registered configuration");
            response::config_found(content)
        }
        LookupOutcome::NotRegistered | LookupOutcome::FileUnavailable => {
            tracing::info!(request_id = %request_id, repo = %url, "No override, default applies");
            response::use_default()
        }
    }
}

/// `POST /update`: verify the webhook signature, then refresh.
///
/// Only routed when a secret is configured.
pub async fn trigger_refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = request_id(&headers);

    let Some(auth) = state.webhook.as_ref() else {
        return response::status_error(StatusCode::NOT_FOUND, "refresh endpoint disabled");
    };

    if let Err(e) = auth.authenticate(&headers, &body) {
        let reason = match e {
            AuthError::MissingSignature(_) => "missing_signature",
            AuthError::InvalidSignature => "invalid_signature",
        };
        metrics::record_webhook_rejection(reason);
        tracing::warn!(request_id = %request_id, error = %e, "Refresh request rejected");
        return response::status_error(StatusCode::FORBIDDEN, e.to_string());
    }

    tracing::info!(request_id = %request_id, "Refresh triggered by webhook");

    // Own task: a dropped connection must not abandon the refresh halfway.
    let store = Arc::clone(&state.store);
    let outcome = tokio::spawn(async move { store.refresh().await }).await;

    match outcome {
        Ok(Ok(report)) => {
            tracing::info!(
                request_id = %request_id,
                entries = report.entries,
                generation = report.generation,
                "Refresh complete"
            );
            response::status_ok()
        }
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "Refresh failed");
            response::status_error(StatusCode::OK, e.to_string())
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Refresh task aborted");
            response::status_error(StatusCode::OK, format!("refresh task did not complete: {}", e))
        }
    }
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub entries: usize,
    pub generation: u64,
    /// Unix seconds of the last successful refresh.
    pub last_refresh: u64,
}

/// `GET /healthz`
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let snapshot = state.store.snapshot();
    Json(HealthStatus {
        status: "ok",
        entries: snapshot.index.len(),
        generation: snapshot.generation,
        last_refresh: snapshot
            .loaded_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
    })
}
