//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Probe attempt:
//!     → timeouts.rs (per-attempt deadline)
//!     → On transient failure: retries.rs (retry with backoff.rs delay)
//!
//! Run:
//!     → timeouts.rs (overall deadline, optional)
//! ```
//!
//! # Design Decisions
//! - Every probe attempt has a deadline
//! - Retries default to off and only cover transient errors

pub mod backoff;
pub mod retries;
pub mod timeouts;
