//! Webhook authentication for refresh requests.
//!
//! # Responsibilities
//! - Compute HMAC-SHA256 of the raw request body with the shared secret
//! - Compare against the signature header in constant time
//!
//! # Design Decisions
//! - Signatures are lowercase hex of the full digest, no `sha256=` prefix
//!   (Gitea's `X-Gitea-Signature` format)
//! - The body is verified exactly as received, before any parsing
//! - Fail closed: no secret means no refresh endpoint at all (see http::server)

use std::fmt;

use axum::http::header::InvalidHeaderName;
use axum::http::{HeaderMap, HeaderName};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::WebhookConfig;

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 of `payload` keyed with `secret`.
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Check `signature_hex` against the HMAC of `payload`.
///
/// Returns false on any mismatch, including a length difference.
pub fn verify(payload: &[u8], signature_hex: &str, secret: &str) -> bool {
    let computed = sign(payload, secret);
    let provided = signature_hex.as_bytes();

    if provided.len() != computed.len() {
        return false;
    }
    computed.as_bytes().ct_eq(provided).into()
}

/// Why a refresh request was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing {0} header")]
    MissingSignature(HeaderName),

    #[error("invalid signature")]
    InvalidSignature,
}

/// Shared secret plus the header the signature arrives in.
#[derive(Clone)]
pub struct WebhookAuth {
    secret: String,
    header: HeaderName,
}

impl WebhookAuth {
    pub fn new(secret: impl Into<String>, header: &str) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            secret: secret.into(),
            header: HeaderName::from_bytes(header.as_bytes())?,
        })
    }

    /// `None` when no secret is configured.
    pub fn from_config(config: &WebhookConfig) -> Result<Option<Self>, InvalidHeaderName> {
        config
            .secret
            .as_ref()
            .map(|secret| Self::new(secret.clone(), &config.signature_header))
            .transpose()
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Verify the signature header against the raw `body`.
    pub fn authenticate(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), AuthError> {
        let provided = headers
            .get(&self.header)
            .ok_or_else(|| AuthError::MissingSignature(self.header.clone()))?;

        // Non-ASCII header values can never match a hex digest.
        let provided = provided.to_str().map_err(|_| AuthError::InvalidSignature)?;

        if verify(body, provided, &self.secret) {
            Ok(())
        } else {
            Err(AuthError::InvalidSignature)
        }
    }
}

impl fmt::Debug for WebhookAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookAuth")
            .field("secret", &"<redacted>")
            .field("header", &self.header)
            .finish()
    }
}
