//! Inbound request types.
//!
//! # Responsibilities
//! - Deserialize the CI server's configuration request
//! - Expose the request ID assigned by the request-id layer
//!
//! # Design Decisions
//! - Only `repo.git_http_url` is read; every other field the CI server sends
//!   is ignored
//! - Bodies are parsed from raw bytes, so a missing Content-Type is not an error

use axum::http::HeaderMap;
use serde::Deserialize;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Body of `POST /`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigRequest {
    pub repo: RepoRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoRef {
    pub git_http_url: String,
}

impl ConfigRequest {
    /// Parse a request body, rejecting a missing or empty repository URL.
    pub fn parse(body: &[u8]) -> Result<Self, String> {
        let request: ConfigRequest = serde_json::from_slice(body).map_err(|e| e.to_string())?;
        if request.repo.git_http_url.trim().is_empty() {
            return Err("repo.git_http_url is empty".to_string());
        }
        Ok(request)
    }
}

/// The request ID set by `SetRequestIdLayer`, or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_extra_fields() {
        let body = br#"{
            "build": {"after": "abc123"},
            "repo": {"git_http_url": "https://example.com/r.git", "slug": "org/r"}
        }"#;
        let request = ConfigRequest::parse(body).unwrap();
        assert_eq!(request.repo.git_http_url, "https://example.com/r.git");
    }

    #[test]
    fn test_parse_rejects_missing_url() {
        assert!(ConfigRequest::parse(b"").is_err());
        assert!(ConfigRequest::parse(b"{}").is_err());
        assert!(ConfigRequest::parse(br#"{"repo": {}}"#).is_err());
        assert!(ConfigRequest::parse(br#"{"repo": {"git_http_url": 7}}"#).is_err());
        assert!(ConfigRequest::parse(br#"{"repo": {"git_http_url": " "}}"#).is_err());
    }
}
