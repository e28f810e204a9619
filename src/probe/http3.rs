//! HTTP/3 probe client.
//!
//! # Responsibilities
//! - Issue a single GET over QUIC (no TCP fallback)
//! - Collect response headers in canonical form
//! - Classify transport errors into `ProbeError`
//!
//! # Design Decisions
//! - Prior knowledge: the request is sent as HTTP/3 directly, so a host
//!   without QUIC support fails instead of silently downgrading
//! - No client-side timeout; the engine wraps every attempt in its own deadline
//! - Certificate checks are configurable and off by default

use std::error::Error as StdError;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::config::ProbeConfig;
use crate::probe::client::{canonical_header_name, HeaderFields, ProbeClient, ProbeError};
use crate::targets::Target;

/// Error type for client construction.
#[derive(Debug, thiserror::Error)]
#[error("failed to build HTTP/3 client: {0}")]
pub struct ClientBuildError(#[from] reqwest::Error);

/// Production probe client speaking HTTP/3.
#[derive(Debug, Clone)]
pub struct Http3Client {
    client: reqwest::Client,
}

impl Http3Client {
    pub fn new(config: &ProbeConfig) -> Result<Self, ClientBuildError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .http3_prior_knowledge()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .user_agent(config.user_agent.clone())
            .no_proxy()
            .build()?;

        tracing::debug!(
            accept_invalid_certs = config.accept_invalid_certs,
            user_agent = %config.user_agent,
            "HTTP/3 client ready"
        );
        Ok(Self { client })
    }
}

#[async_trait]
impl ProbeClient for Http3Client {
    async fn probe(&self, target: &Target) -> Result<HeaderFields, ProbeError> {
        let response = self
            .client
            .get(target.url().clone())
            .version(reqwest::Version::HTTP_3)
            .send()
            .await
            .map_err(classify)?;

        tracing::trace!(status = %response.status(), version = ?response.version(), "Response received");
        Ok(collect_headers(response.headers()))
    }
}

fn classify(error: reqwest::Error) -> ProbeError {
    let message = error_chain(&error);
    if error.is_connect() || error.is_timeout() {
        ProbeError::Connect(message)
    } else {
        ProbeError::Protocol(message)
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn collect_headers(headers: &HeaderMap) -> HeaderFields {
    let mut fields = HeaderFields::new();
    for (name, value) in headers {
        fields
            .entry(canonical_header_name(name.as_str()))
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_collect_headers_groups_values() {
        let mut headers = HeaderMap::new();
        headers.insert("alt-svc", HeaderValue::from_static("h3=\":443\""));
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));

        let fields = collect_headers(&headers);
        assert_eq!(fields["Alt-Svc"], vec!["h3=\":443\""]);
        assert_eq!(fields["Set-Cookie"], vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_error_chain_skips_repeats() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer")]
        struct Outer(#[source] Inner);

        #[derive(Debug, thiserror::Error)]
        #[error("connection refused")]
        struct Inner;

        assert_eq!(error_chain(&Outer(Inner)), "outer: connection refused");
    }
}
