//! Survey run orchestration.
//!
//! # Responsibilities
//! - Build the per-run shared state (ledger, slots, barrier, artifact writer)
//! - Drive dispatch, then wait on the completion barrier
//! - Close the run early on deadline or interrupt, expiring unsettled targets
//! - Emit the failure report once nothing can write to the ledger any more

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::SurveyConfig;
use crate::engine::dispatcher::{Dispatcher, RunContext, Tally};
use crate::engine::ledger::FailureLedger;
use crate::engine::slots::SettlementSlots;
use crate::lifecycle::shutdown::triggered;
use crate::probe::ProbeClient;
use crate::report::{write_failure_report, ArtifactWriter, ReportError, RunLayout};
use crate::resilience::retries::RetryPolicy;
use crate::resilience::timeouts::run_deadline;
use crate::targets::Target;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Errors that end a run without a complete report.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Engine tuning, usually derived from `SurveyConfig`.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Probes in flight at once; 0 = unbounded.
    pub max_concurrency: usize,
    pub probe_timeout: Duration,
    pub run_timeout: Option<Duration>,
    pub retry: RetryPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 512,
            probe_timeout: Duration::from_secs(10),
            run_timeout: None,
            retry: RetryPolicy::none(),
        }
    }
}

impl From<&SurveyConfig> for EngineSettings {
    fn from(config: &SurveyConfig) -> Self {
        Self {
            max_concurrency: config.probe.max_concurrency,
            probe_timeout: config.probe.timeout(),
            run_timeout: config.probe.run_timeout(),
            retry: RetryPolicy::from(&config.retries),
        }
    }
}

/// Why a run stopped before every probe finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    DeadlineExceeded,
    Interrupted,
}

impl CloseReason {
    /// Ledger reason recorded for targets the run closed on.
    pub fn reason(&self) -> &'static str {
        match self {
            CloseReason::DeadlineExceeded => "run timed out",
            CloseReason::Interrupted => "run interrupted",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// What a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub date: String,
    pub output_dir: PathBuf,
    pub failure_report: PathBuf,
    pub total: usize,
    /// Targets with a header artifact on disk.
    pub succeeded: usize,
    /// Targets whose probe failed.
    pub failed: usize,
    /// Targets that answered but whose artifact could not be written.
    pub local_errors: usize,
    /// Targets settled by the run closing early.
    pub expired: usize,
    pub closed_early: Option<CloseReason>,
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Entries in the failure report.
    ///
    /// `succeeded + ledger_entries() == total` holds for unique targets.
    pub fn ledger_entries(&self) -> usize {
        self.failed + self.local_errors + self.expired
    }
}

/// The concurrent probe engine.
pub struct SurveyEngine {
    client: Arc<dyn ProbeClient>,
    settings: EngineSettings,
}

impl SurveyEngine {
    pub fn new(client: Arc<dyn ProbeClient>, settings: EngineSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Probe every target and write the run's output under `layout`.
    ///
    /// Per-target failures never fail the run; only output the run cannot
    /// write (directory, failure report) does.
    ///
    /// Targets are expected to be unique (`parse_targets` guarantees it). A
    /// repeated target is probed once per occurrence but owns one report line.
    pub async fn run(
        &self,
        targets: &[Target],
        layout: RunLayout,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<RunSummary, RunError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id, date = %layout.date());
        self.execute(run_id, targets, layout, &mut shutdown)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        targets: &[Target],
        layout: RunLayout,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<RunSummary, RunError> {
        let started = Instant::now();
        layout.create().await?;
        let layout = Arc::new(layout);

        let ctx = Arc::new(RunContext {
            client: self.client.clone(),
            ledger: FailureLedger::new(),
            artifacts: ArtifactWriter::new(layout.clone()),
            slots: SettlementSlots::new(targets.len()),
            tally: Tally::default(),
            probe_timeout: self.settings.probe_timeout,
            retry: self.settings.retry,
        });

        tracing::info!(
            targets = targets.len(),
            max_concurrency = self.settings.max_concurrency,
            probe_timeout_ms = self.settings.probe_timeout.as_millis() as u64,
            run_timeout = ?self.settings.run_timeout,
            retries = self.settings.retry.max_retries,
            output = %layout.dir().display(),
            "Run starting"
        );

        let dispatcher = Dispatcher::new(self.settings.max_concurrency);
        let mut tasks = JoinSet::new();

        let closed_early = {
            let drained = async {
                dispatcher.dispatch(&ctx, targets, &mut tasks).await;
                ctx.slots.barrier().wait().await;
            };
            tokio::select! {
                _ = drained => None,
                _ = run_deadline(self.settings.run_timeout) => Some(CloseReason::DeadlineExceeded),
                _ = triggered(shutdown) => Some(CloseReason::Interrupted),
                _ = log_progress(&ctx) => None,
            }
        };

        if let Some(reason) = closed_early {
            let expired = ctx.expire_unsettled(targets, reason.reason());
            tracing::warn!(%reason, expired, "Run closed early, unsettled targets recorded as failures");
            // Only probes already writing their outcome are left; let them land.
            ctx.slots.barrier().wait().await;
        }
        tasks.shutdown().await;

        let snapshot = ctx.ledger.snapshot();
        let failure_report = write_failure_report(&layout, &snapshot).await?;

        let summary = RunSummary {
            run_id,
            date: layout.date().to_string(),
            output_dir: layout.dir().to_path_buf(),
            failure_report,
            total: targets.len(),
            succeeded: ctx.tally.succeeded.load(Ordering::Relaxed),
            failed: ctx.tally.failed.load(Ordering::Relaxed),
            local_errors: ctx.tally.local_errors.load(Ordering::Relaxed),
            expired: ctx.tally.expired.load(Ordering::Relaxed),
            closed_early,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            local_errors = summary.local_errors,
            expired = summary.expired,
            elapsed_ms = summary.elapsed_ms,
            "Run complete"
        );
        if summary.local_errors > 0 {
            tracing::error!(
                local_errors = summary.local_errors,
                "Some successful probes have no header artifact; see failure report"
            );
        }
        Ok(summary)
    }
}

/// Periodic progress line for long runs. Never completes.
async fn log_progress(ctx: &RunContext) {
    let start = tokio::time::Instant::now() + PROGRESS_INTERVAL;
    let mut ticker = tokio::time::interval_at(start, PROGRESS_INTERVAL);
    loop {
        ticker.tick().await;
        let barrier = ctx.slots.barrier();
        tracing::info!(
            settled = barrier.expected() - barrier.remaining(),
            remaining = barrier.remaining(),
            failures = ctx.ledger.len(),
            "Progress"
        );
    }
}
