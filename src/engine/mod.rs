//! Concurrent probe engine.
//!
//! # Data Flow
//! ```text
//! Vec<Target>
//!     → dispatcher.rs (semaphore-bounded fan-out, one task per target)
//!     → ProbeClient × N (per-attempt deadline, optional retries)
//!     → slots.rs (claim: exactly one settlement per target)
//!         → Success: report::ArtifactWriter (header-<host>.txt)
//!         → Failure: ledger.rs (insert-if-absent)
//!     → barrier.rs (one arrival per settlement)
//!     → run.rs (barrier released → ledger snapshot → failure report)
//! ```
//!
//! # Design Decisions
//! - The ledger and the barrier are the only shared mutable state
//! - The report is written only after the barrier releases
//! - Deadline and interrupt settle the remaining targets instead of
//!   abandoning them, so `succeeded + report entries == targets` always holds

pub mod barrier;
mod dispatcher;
pub mod ledger;
pub mod run;
pub mod slots;

pub use barrier::{BarrierError, CompletionBarrier};
pub use ledger::FailureLedger;
pub use run::{CloseReason, EngineSettings, RunError, RunSummary, SurveyEngine};
