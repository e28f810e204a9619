//! OS signal handling.
//!
//! Ctrl-C closes the run early: unsettled targets are recorded as
//! interrupted and the failure report is still written. A second Ctrl-C
//! exits immediately.

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Watch for Ctrl-C in the background and trigger `shutdown`.
pub fn spawn_interrupt_listener(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C");
            return;
        }
        tracing::warn!("Interrupt received, closing run and writing report");
        shutdown.trigger();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::error!("Second interrupt, exiting without report");
            std::process::exit(130);
        }
    })
}
