//! Pipeline configuration server library.
//!
//! Serves per-repository CI pipeline configuration out of a mirrored
//! configuration repository, refreshed by signed webhooks.

pub mod config;
pub mod http;
pub mod index;
pub mod lifecycle;
pub mod mirror;
pub mod observability;
pub mod store;
pub mod webhook;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use store::{ConfigStore, LookupOutcome};
