//! A single URL to probe.

use std::fmt;
use std::sync::Arc;

use url::Url;

/// Error type for target construction and loading.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("invalid url {input:?}: {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("url {0:?} has no host")]
    MissingHost(String),

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<TargetError>,
    },

    #[error("rank {0:?} is not a number")]
    BadRank(String),

    #[error("malformed host list: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An immutable probe target.
///
/// The string exactly as produced by the host list is kept; it is the ledger
/// key and the text written to the failure report. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    inner: Arc<TargetInner>,
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct TargetInner {
    raw: String,
    url: Url,
}

impl Target {
    /// Parse a target, rejecting structurally invalid URLs and URLs without a host.
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let raw = input.trim().to_string();
        let url = Url::parse(&raw).map_err(|source| TargetError::InvalidUrl {
            input: raw.clone(),
            source,
        })?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(TargetError::MissingHost(raw));
        }
        Ok(Self {
            inner: Arc::new(TargetInner { raw, url }),
        })
    }

    /// The target string as given.
    pub fn as_str(&self) -> &str {
        &self.inner.raw
    }

    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// Host name of the target. Always present after `parse`.
    pub fn host(&self) -> &str {
        self.inner.url.host_str().unwrap_or_default()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.raw)
    }
}
