//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a survey run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for a survey run.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SurveyConfig {
    /// Probe dispatch and client settings.
    pub probe: ProbeConfig,

    /// Retry configuration (off by default).
    pub retries: RetryConfig,

    /// Host list interpretation.
    pub targets: TargetsConfig,

    /// Where artifacts and the failure report are written.
    pub output: OutputConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Probe dispatch and client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Maximum probes in flight at once. 0 disables the bound.
    pub max_concurrency: usize,

    /// Deadline for a single probe attempt in seconds.
    pub timeout_secs: u64,

    /// Deadline for the whole run in seconds. 0 disables it.
    pub run_timeout_secs: u64,

    /// User-Agent header sent with every probe.
    pub user_agent: String,

    /// Skip certificate verification. Only QUIC support is measured, not PKI hygiene.
    pub accept_invalid_certs: bool,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn run_timeout(&self) -> Option<Duration> {
        (self.run_timeout_secs > 0).then(|| Duration::from_secs(self.run_timeout_secs))
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 512,
            timeout_secs: 10,
            run_timeout_secs: 0,
            user_agent: concat!("h3-survey/", env!("CARGO_PKG_VERSION")).to_string(),
            accept_invalid_certs: true,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Extra attempts after the first one. 0 = no retries.
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 250,
            max_delay_ms: 4000,
        }
    }
}

/// Host list interpretation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetsConfig {
    /// Prefix placed before bare domains read from `rank,domain` rows.
    pub url_prefix: String,

    /// Keep only the first N targets.
    pub limit: Option<usize>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            url_prefix: "https://www.".to_string(),
            limit: None,
        }
    }
}

/// Output layout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory; each run writes into `<root>/<date>`.
    pub root: PathBuf,

    /// Override for the run date (`YYYY-MM-DD`). Defaults to today.
    pub run_date: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./headers"),
            run_date: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint for long runs.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
