//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, backoff bounds ordered)
//! - Validate formats serde cannot see (run date, metrics address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SurveyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use chrono::NaiveDate;

use crate::config::schema::SurveyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("probe.timeout_secs must be greater than 0")]
    ZeroProbeTimeout,

    #[error("probe.run_timeout_secs ({run}) is shorter than probe.timeout_secs ({probe})")]
    RunTimeoutShorterThanProbe { run: u64, probe: u64 },

    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    BackoffBoundsInverted { base: u64, max: u64 },

    #[error("targets.url_prefix must start with http:// or https:// (got {0:?})")]
    BadUrlPrefix(String),

    #[error("targets.limit must be greater than 0")]
    ZeroLimit,

    #[error("output.run_date must be YYYY-MM-DD (got {0:?})")]
    BadRunDate(String),

    #[error("observability.metrics_address is not a socket address (got {0:?})")]
    BadMetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &SurveyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let probe = &config.probe;
    if probe.timeout_secs == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    }
    if probe.run_timeout_secs > 0 && probe.run_timeout_secs < probe.timeout_secs {
        errors.push(ValidationError::RunTimeoutShorterThanProbe {
            run: probe.run_timeout_secs,
            probe: probe.timeout_secs,
        });
    }

    let retries = &config.retries;
    if retries.max_retries > 0 && retries.base_delay_ms > retries.max_delay_ms {
        errors.push(ValidationError::BackoffBoundsInverted {
            base: retries.base_delay_ms,
            max: retries.max_delay_ms,
        });
    }

    let prefix = &config.targets.url_prefix;
    if !(prefix.starts_with("https://") || prefix.starts_with("http://")) {
        errors.push(ValidationError::BadUrlPrefix(prefix.clone()));
    }
    if config.targets.limit == Some(0) {
        errors.push(ValidationError::ZeroLimit);
    }

    if let Some(date) = &config.output.run_date {
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            errors.push(ValidationError::BadRunDate(date.clone()));
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::BadMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
