//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured fields, request IDs via tower-http)
//!     → metrics.rs (lookup/refresh counters, index size, refresh latency)
//!
//! Consumers:
//!     → stdout (pretty or JSON, see logging.rs)
//!     → Prometheus scrape endpoint (optional, METRICS_ADDRESS)
//! ```
//!
//! # Design Decisions
//! - Metrics are cheap and no-ops when no exporter is installed
//! - The exporter is opt-in; the service itself has no metrics route

pub mod logging;
pub mod metrics;
