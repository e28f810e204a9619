//! Probe dispatcher.
//!
//! # Responsibilities
//! - Spawn one probe task per target without one probe blocking another's launch
//! - Bound probes in flight with a semaphore (backpressure on dispatch)
//! - Apply per-attempt deadline and retry policy around the probe client
//! - Settle each target: artifact on success, ledger entry on failure
//!
//! # Design Decisions
//! - The permit is acquired before spawning, so at most `max_concurrency`
//!   tasks exist at once and memory stays flat for huge host lists
//! - A panicking client is contained and becomes a failure for its target
//! - A lost artifact write is a distinct local error, never a success

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::engine::ledger::FailureLedger;
use crate::engine::slots::SettlementSlots;
use crate::observability::metrics;
use crate::probe::{HeaderFields, ProbeClient, ProbeError, ProbeOutcome};
use crate::report::ArtifactWriter;
use crate::resilience::retries::{retry, RetryPolicy};
use crate::resilience::timeouts::with_probe_timeout;
use crate::targets::Target;

/// Per-run counters, read once the run has closed.
///
/// Failure counters move only when the ledger takes a new entry, so their
/// sum matches the report even if a target was handed in twice.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub succeeded: AtomicUsize,
    pub failed: AtomicUsize,
    pub local_errors: AtomicUsize,
    pub expired: AtomicUsize,
}

impl Tally {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// State shared by every probe task of one run.
pub(crate) struct RunContext {
    pub client: Arc<dyn ProbeClient>,
    pub ledger: FailureLedger,
    pub artifacts: ArtifactWriter,
    pub slots: SettlementSlots,
    pub tally: Tally,
    pub probe_timeout: Duration,
    pub retry: RetryPolicy,
}

impl RunContext {
    /// One probe including retries; every attempt has its own deadline.
    async fn attempt(&self, target: &Target) -> Result<HeaderFields, ProbeError> {
        retry(&self.retry, |attempt| {
            if attempt > 0 {
                tracing::debug!(attempt, "Probe attempt");
            }
            with_probe_timeout(self.probe_timeout, contained_probe(self.client.as_ref(), target))
        })
        .await
    }

    /// Settle every target nobody has claimed yet as a failure with `reason`.
    pub fn expire_unsettled(&self, targets: &[Target], reason: &str) -> usize {
        let mut expired = 0;
        for (index, target) in targets.iter().enumerate() {
            if let Some(_settlement) = self.slots.claim(index) {
                if self.ledger.record_failure(target, reason) {
                    expired += 1;
                }
            }
        }
        self.tally.expired.fetch_add(expired, Ordering::Relaxed);
        metrics::record_expired(expired);
        expired
    }
}

/// Fans targets out to probe tasks.
#[derive(Debug)]
pub(crate) struct Dispatcher {
    limiter: Option<Arc<Semaphore>>,
}

impl Dispatcher {
    /// `max_concurrency == 0` means no bound.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            limiter: (max_concurrency > 0).then(|| Arc::new(Semaphore::new(max_concurrency))),
        }
    }

    /// Spawn a probe task for every target onto `tasks`.
    ///
    /// Returns once the last task has been spawned; waits for permits when
    /// the concurrency bound is reached.
    pub async fn dispatch(&self, ctx: &Arc<RunContext>, targets: &[Target], tasks: &mut JoinSet<()>) {
        for (index, target) in targets.iter().enumerate() {
            let permit = match &self.limiter {
                Some(limiter) => limiter.clone().acquire_owned().await.ok(),
                None => None,
            };
            reap_finished(tasks);

            let span = tracing::info_span!("probe", url = %target);
            tasks.spawn(probe_target(ctx.clone(), index, target.clone(), permit).instrument(span));
        }
        tracing::debug!(dispatched = targets.len(), "All probes dispatched");
    }
}

fn reap_finished(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.try_join_next() {
        if let Err(e) = result {
            if e.is_panic() {
                tracing::error!(error = %e, "Probe task panicked");
            }
        }
    }
}

async fn probe_target(
    ctx: Arc<RunContext>,
    index: usize,
    target: Target,
    _permit: Option<OwnedSemaphorePermit>,
) {
    let started = Instant::now();
    let result = {
        let _in_flight = metrics::InFlight::start();
        ctx.attempt(&target).await
    };

    let Some(_settlement) = ctx.slots.claim(index) else {
        tracing::debug!("Run already closed, discarding outcome");
        return;
    };

    let outcome = ProbeOutcome::from(result);
    metrics::record_probe(outcome.label(), started.elapsed());

    match outcome {
        ProbeOutcome::Success { headers } => match ctx.artifacts.write(&target, &headers).await {
            Ok(path) => {
                tracing::debug!(path = %path.display(), headers = headers.len(), "Probe succeeded");
                Tally::bump(&ctx.tally.succeeded);
            }
            Err(e) => {
                tracing::error!(error = %e, "Probe succeeded but its header artifact was lost");
                metrics::record_artifact_error();
                if ctx.ledger.record_failure(&target, format!("local i/o error: {e}")) {
                    Tally::bump(&ctx.tally.local_errors);
                }
            }
        },
        ProbeOutcome::Failure { reason } => {
            tracing::debug!(%reason, "Probe failed");
            if ctx.ledger.record_failure(&target, reason) {
                Tally::bump(&ctx.tally.failed);
            }
        }
    }
}

/// Run the client, turning a panic into a failure for this target.
async fn contained_probe(client: &dyn ProbeClient, target: &Target) -> Result<HeaderFields, ProbeError> {
    match AssertUnwindSafe(client.probe(target)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(ProbeError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_payloads() {
        let literal: Box<dyn Any + Send> = Box::new("boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        let other: Box<dyn Any + Send> = Box::new(42u8);

        assert_eq!(panic_message(literal.as_ref()), "boom");
        assert_eq!(panic_message(owned.as_ref()), "kaboom");
        assert_eq!(panic_message(other.as_ref()), "unknown panic payload");
    }

    #[test]
    fn test_zero_concurrency_is_unbounded() {
        assert!(Dispatcher::new(0).limiter.is_none());
        assert_eq!(
            Dispatcher::new(4).limiter.unwrap().available_permits(),
            4
        );
    }
}
