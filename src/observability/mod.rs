//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → structured log events (tracing)
//!     → counters, gauges, histograms (metrics.rs)
//!
//! Consumers:
//!     → stdout log aggregation
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Metric updates are cheap atomic operations; recording with no
//!   exporter installed is a no-op, so tests never need one
//! - Request IDs flow through logs via the x-request-id header

pub mod logging;
pub mod metrics;
