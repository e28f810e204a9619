//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine and probe tasks produce:
//!     → logging.rs (structured log events, `run` and `probe` spans)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stderr (fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Every probe runs inside a span carrying its target
//! - Metrics are cheap (atomic increments) and safe to record without an exporter

pub mod logging;
pub mod metrics;
