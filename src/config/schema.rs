//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! Values are filled in by `config::loader` from the environment; the
//! webhook secret never appears in `Debug` output.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default header carrying the webhook signature.
pub const DEFAULT_SIGNATURE_HEADER: &str = "X-Gitea-Signature";

/// Root configuration for the configuration server.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, port).
    pub listener: ListenerConfig,

    /// Upstream configuration repository and its local mirror.
    pub repository: RepositoryConfig,

    /// Refresh webhook settings.
    pub webhook: WebhookConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Host or IP to bind (e.g., "0.0.0.0").
    pub bind_address: String,

    /// Listen port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Upstream repository configuration.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Location of the upstream configuration repository (anything `git clone` accepts).
    pub url: String,

    /// Local mirror root.
    pub data_folder: PathBuf,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            data_folder: PathBuf::from("data"),
        }
    }
}

/// Refresh webhook configuration.
#[derive(Clone)]
pub struct WebhookConfig {
    /// Shared HMAC secret. `None` disables the refresh endpoint entirely.
    pub secret: Option<String>,

    /// Header carrying the hex-encoded signature.
    pub signature_header: String,
}

impl WebhookConfig {
    /// Whether the refresh endpoint should be exposed.
    pub fn enabled(&self) -> bool {
        self.secret.is_some()
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            signature_header: DEFAULT_SIGNATURE_HEADER.to_string(),
        }
    }
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("signature_header", &self.signature_header)
            .finish()
    }
}

/// Timeout configuration.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Covers `/update`, so it must leave room for a full clone or pull.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Default)]
pub struct ObservabilityConfig {
    /// Log output format.
    pub log_format: LogFormat,

    /// Prometheus exporter bind address; exporter disabled when unset.
    pub metrics_address: Option<SocketAddr>,
}
