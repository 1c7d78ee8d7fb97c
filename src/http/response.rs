//! Response bodies.
//!
//! # Responsibilities
//! - `{"data": ...}` for a configuration hit
//! - `{"status": "ok"}` / `{"status": "error", "msg": ...}` for everything else
//!
//! # Design Decisions
//! - A lookup miss is `204` with no body; the CI server then uses the
//!   repository's own configuration

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Body of a configuration hit.
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub data: String,
}

/// Status body used by `/update` and error responses.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok",
            msg: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error",
            msg: Some(msg.into()),
        }
    }
}

pub fn config_found(content: String) -> Response {
    (StatusCode::OK, Json(ConfigResponse { data: content })).into_response()
}

pub fn use_default() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

pub fn status_ok() -> Response {
    (StatusCode::OK, Json(StatusResponse::ok())).into_response()
}

pub fn status_error(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(StatusResponse::error(msg))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_bodies() {
        assert_eq!(
            serde_json::to_string(&StatusResponse::ok()).unwrap(),
            r#"{"status":"ok"}"#
        );
        assert_eq!(
            serde_json::to_string(&StatusResponse::error("invalid signature")).unwrap(),
            r#"{"status":"error","msg":"invalid signature"}"#
        );
    }

    #[test]
    fn test_config_body() {
        let body = ConfigResponse {
            data: "kind: pipeline".to_string(),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"data":"kind: pipeline"}"#);
    }
}
