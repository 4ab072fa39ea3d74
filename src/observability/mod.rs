//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields over formatted strings
//! - RUST_LOG overrides the configured level
//! - Metrics are cheap counters; recording without an exporter is a no-op

pub mod logging;
pub mod metrics;
