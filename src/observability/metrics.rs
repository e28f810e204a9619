//! Metrics collection and exposition.
//!
//! # Metrics
//! - `survey_probes_total` (counter): settled probes by outcome
//! - `survey_probe_duration_seconds` (histogram): time spent probing, retries included
//! - `survey_probes_in_flight` (gauge): probes currently waiting on the network
//! - `survey_artifact_errors_total` (counter): successes lost to local I/O errors
//! - `survey_probes_expired_total` (counter): targets closed by deadline or interrupt
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - The Prometheus endpoint is opt-in; a million-host run takes hours and
//!   is worth watching, a small one is not

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("survey_probes_total", "outcome" => outcome).increment(1);
    metrics::histogram!("survey_probe_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_artifact_error() {
    metrics::counter!("survey_artifact_errors_total").increment(1);
}

pub fn record_expired(count: usize) {
    metrics::counter!("survey_probes_expired_total").increment(count as u64);
}

/// Marks one probe as in flight until dropped.
#[derive(Debug)]
pub struct InFlight(());

impl InFlight {
    pub fn start() -> Self {
        metrics::gauge!("survey_probes_in_flight").increment(1.0);
        Self(())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        metrics::gauge!("survey_probes_in_flight").decrement(1.0);
    }
}
