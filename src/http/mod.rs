//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, trace, timeout, body limit)
//!     → request.rs (parse {"repo": {"git_http_url": ...}})
//!     → handlers.rs
//!         POST /        → store.resolve → 200 {"data"} | 204
//!         POST /update  → webhook.authenticate → store.refresh → {"status"}
//!         GET  /healthz → active snapshot summary
//!     → response.rs (JSON bodies)
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
