//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment (REPOSITORY_URL, SERVER_PORT, ...)
//!     → loader.rs (read, fall back to legacy DRONE_* names, validate)
//!     → ServerConfig (validated, immutable)
//!     → handed to lifecycle::startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields except the repository URL have defaults
//! - The variable source is injectable so tests never mutate the environment

pub mod loader;
pub mod schema;

pub use loader::ConfigError;
pub use schema::ServerConfig;
pub use schema::ListenerConfig;
pub use schema::RepositoryConfig;
pub use schema::WebhookConfig;
