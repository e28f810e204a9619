//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap each probe attempt with the per-probe deadline
//! - Provide the run-level deadline future
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors (`ProbeError::Timeout`)

use std::future::Future;
use std::time::Duration;

use crate::probe::ProbeError;

/// Bound a probe attempt; expiry becomes `ProbeError::Timeout`.
pub async fn with_probe_timeout<T, F>(limit: Duration, attempt: F) -> Result<T, ProbeError>
where
    F: Future<Output = Result<T, ProbeError>>,
{
    match tokio::time::timeout(limit, attempt).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout(limit)),
    }
}

/// Resolves when the run deadline passes; never resolves without one.
pub async fn run_deadline(limit: Option<Duration>) {
    match limit {
        Some(limit) => tokio::time::sleep(limit).await,
        None => std::future::pending().await,
    }
}
