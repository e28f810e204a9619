//! Probe client capability and outcome types.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::resilience::retries::Retryable;
use crate::targets::Target;

/// Response headers: canonical header name to every value received, in order.
pub type HeaderFields = BTreeMap<String, Vec<String>>;

/// Why a probe did not produce a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// No response within the per-probe deadline.
    #[error("timeout: no response after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection could not be established (refused, unreachable, handshake).
    #[error("{0}")]
    Connect(String),

    /// Connected, but the exchange failed (protocol negotiation, stream reset, ...).
    #[error("{0}")]
    Protocol(String),

    /// The client implementation panicked while probing.
    #[error("probe client panicked: {0}")]
    Panicked(String),
}

impl Retryable for ProbeError {
    fn is_retryable(&self) -> bool {
        matches!(self, ProbeError::Timeout(_) | ProbeError::Connect(_))
    }
}

/// Result of probing one target. Produced exactly once per target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success { headers: HeaderFields },
    Failure { reason: String },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }

    /// Label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeOutcome::Success { .. } => "success",
            ProbeOutcome::Failure { .. } => "failure",
        }
    }
}

impl From<Result<HeaderFields, ProbeError>> for ProbeOutcome {
    fn from(result: Result<HeaderFields, ProbeError>) -> Self {
        match result {
            Ok(headers) => ProbeOutcome::Success { headers },
            Err(e) => ProbeOutcome::Failure {
                reason: e.to_string(),
            },
        }
    }
}

/// Performs one request against a target over the protocol under test.
///
/// Implementations must not retry or apply their own deadline; the engine
/// owns both.
#[async_trait]
pub trait ProbeClient: Send + Sync {
    async fn probe(&self, target: &Target) -> Result<HeaderFields, ProbeError>;
}

/// Canonical MIME header form: `alt-svc` → `Alt-Svc`.
pub fn canonical_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        upper = c == '-';
    }
    out
}
