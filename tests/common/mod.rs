//! Shared utilities for survey integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use h3_survey::probe::{HeaderFields, ProbeClient, ProbeError};
use h3_survey::targets::Target;

/// What the scripted client does for one host.
#[derive(Debug, Clone)]
pub enum Script {
    Respond(HeaderFields),
    Fail(ProbeError),
    /// Never answers.
    Hang,
    Panic(&'static str),
    /// Sleep, then play the inner script.
    Delay(Duration, Box<Script>),
    /// Fail the first `failures` calls with `error`, then respond.
    Flaky {
        failures: usize,
        error: ProbeError,
        headers: HeaderFields,
    },
}

impl Script {
    pub fn delayed(self, delay: Duration) -> Self {
        Script::Delay(delay, Box::new(self))
    }
}

/// Probe client that plays back per-host scripts instead of touching the network.
pub struct ScriptedClient {
    scripts: HashMap<String, Script>,
    fallback: Script,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(fallback: Script) -> Self {
        Self {
            scripts: HashMap::new(),
            fallback,
            calls: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, host: &str, script: Script) -> Self {
        self.scripts.insert(host.to_string(), script);
        self
    }

    /// Times `host` has been probed.
    pub fn calls(&self, host: &str) -> usize {
        self.calls.lock().unwrap().get(host).copied().unwrap_or(0)
    }

    /// Highest number of probes observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record_call(&self, host: &str) -> usize {
        let mut calls = self.calls.lock().unwrap();
        let count = calls.entry(host.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

struct Occupancy<'a>(&'a AtomicUsize);

impl Drop for Occupancy<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProbeClient for ScriptedClient {
    async fn probe(&self, target: &Target) -> Result<HeaderFields, ProbeError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _occupancy = Occupancy(&self.in_flight);

        let call = self.record_call(target.host());
        let mut script = self.scripts.get(target.host()).unwrap_or(&self.fallback);
        while let Script::Delay(delay, next) = script {
            tokio::time::sleep(*delay).await;
            script = next.as_ref();
        }

        match script {
            Script::Respond(headers) => Ok(headers.clone()),
            Script::Fail(error) => Err(error.clone()),
            Script::Hang => std::future::pending().await,
            Script::Panic(message) => panic!("{}", message),
            Script::Flaky {
                failures,
                error,
                headers,
            } => {
                if call <= *failures {
                    Err(error.clone())
                } else {
                    Ok(headers.clone())
                }
            }
            Script::Delay(..) => unreachable!(),
        }
    }
}

pub fn headers(pairs: &[(&str, &[&str])]) -> HeaderFields {
    pairs
        .iter()
        .map(|(name, values)| {
            (
                name.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}

pub fn alt_svc() -> HeaderFields {
    headers(&[("Alt-Svc", &["h3=\":443\""])])
}

pub fn targets(urls: &[&str]) -> Vec<Target> {
    urls.iter().map(|u| Target::parse(u).unwrap()).collect()
}

/// Non-empty lines of the failure report, in file order.
pub fn report_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn artifact_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.starts_with("header-") && name.ends_with(".txt")
        })
        .count()
}
