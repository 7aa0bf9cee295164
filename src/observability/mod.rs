//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (human-readable or JSON lines)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event instead of formatted strings
//! - Request ID (`x-request-id`) set by the engine and visible in trace spans
//! - Metrics are cheap to record and silently dropped when no recorder is installed

pub mod logging;
pub mod metrics;
