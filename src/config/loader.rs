//! Configuration loading from the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::{LogFormat, ServerConfig};

pub const REPOSITORY_URL: &str = "REPOSITORY_URL";
pub const SERVER_PORT: &str = "SERVER_PORT";
pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
pub const DATA_FOLDER: &str = "DATA_FOLDER";
pub const WEBHOOK_SECRET: &str = "WEBHOOK_SECRET";
pub const WEBHOOK_SIGNATURE_HEADER: &str = "WEBHOOK_SIGNATURE_HEADER";
pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
pub const LOG_FORMAT: &str = "LOG_FORMAT";
pub const METRICS_ADDRESS: &str = "METRICS_ADDRESS";

/// Older deployments used `DRONE_`-prefixed names; they are honored when the
/// primary name is unset.
const LEGACY_NAMES: &[(&str, &str)] = &[
    (REPOSITORY_URL, "DRONE_YAML_REPOSITORY_URL"),
    (SERVER_PORT, "DRONE_SERVER_PORT"),
    (DATA_FOLDER, "DRONE_DATA_FOLDER"),
];

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Load configuration from the process environment.
pub fn load_from_env() -> Result<ServerConfig, ConfigError> {
    load_with(|name| std::env::var(name).ok())
}

/// Load configuration using `lookup` as the variable source.
pub fn load_with<F>(lookup: F) -> Result<ServerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &'static str| -> Option<String> {
        let value = lookup(name).or_else(|| {
            LEGACY_NAMES
                .iter()
                .find(|(primary, _)| *primary == name)
                .and_then(|&(_, legacy)| lookup(legacy))
        })?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    };

    let mut config = ServerConfig::default();

    config.repository.url = get(REPOSITORY_URL).ok_or(ConfigError::Missing(REPOSITORY_URL))?;

    if let Some(folder) = get(DATA_FOLDER) {
        config.repository.data_folder = PathBuf::from(folder);
    }

    if let Some(port) = get(SERVER_PORT) {
        config.listener.port = port.parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Invalid {
                var: SERVER_PORT,
                value: port.clone(),
                reason: e.to_string(),
            }
        })?;
    }

    if let Some(addr) = get(BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }

    // An empty secret counts as unset: the endpoint stays closed.
    config.webhook.secret = get(WEBHOOK_SECRET);

    if let Some(header) = get(WEBHOOK_SIGNATURE_HEADER) {
        HeaderName::from_bytes(header.as_bytes()).map_err(|e| ConfigError::Invalid {
            var: WEBHOOK_SIGNATURE_HEADER,
            value: header.clone(),
            reason: e.to_string(),
        })?;
        config.webhook.signature_header = header;
    }

    if let Some(secs) = get(REQUEST_TIMEOUT_SECS) {
        let parsed: u64 = secs.parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Invalid {
                var: REQUEST_TIMEOUT_SECS,
                value: secs.clone(),
                reason: e.to_string(),
            }
        })?;
        if parsed == 0 {
            return Err(ConfigError::Invalid {
                var: REQUEST_TIMEOUT_SECS,
                value: secs,
                reason: "must be greater than zero".to_string(),
            });
        }
        config.timeouts.request_secs = parsed;
    }

    if let Some(format) = get(LOG_FORMAT) {
        config.observability.log_format = match format.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => {
                return Err(ConfigError::Invalid {
                    var: LOG_FORMAT,
                    value: format,
                    reason: "expected \"pretty\" or \"json\"".to_string(),
                })
            }
        };
    }

    if let Some(addr) = get(METRICS_ADDRESS) {
        let parsed = addr.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: METRICS_ADDRESS,
            value: addr.clone(),
            reason: e.to_string(),
        })?;
        config.observability.metrics_address = Some(parsed);
    }

    Ok(config)
}
