//! Large runs with randomized timing: the report must only appear once every
//! target has settled, and every target must be accounted for exactly once.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use h3_survey::engine::{EngineSettings, SurveyEngine};
use h3_survey::lifecycle::Shutdown;
use h3_survey::probe::ProbeError;
use h3_survey::report::RunLayout;
use h3_survey::resilience::retries::RetryPolicy;

mod common;
use common::{alt_svc, artifact_count, report_lines, targets, Script, ScriptedClient};

const TARGETS: usize = 10_000;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_ten_thousand_targets_settle_exactly_once() {
    let out = tempfile::tempdir().unwrap();
    let mut rng = rand::thread_rng();
    let mut client = ScriptedClient::new(Script::Respond(alt_svc()));
    let mut urls = Vec::with_capacity(TARGETS);
    let mut expected_failures = 0;

    for i in 0..TARGETS {
        let host = format!("s{i}.example");
        let delay = Duration::from_micros(rng.gen_range(0..2_000));
        let script = if rng.gen_bool(0.4) {
            expected_failures += 1;
            Script::Fail(ProbeError::Connect("connection refused".into()))
        } else {
            Script::Respond(alt_svc())
        };
        client = client.with(&host, script.delayed(delay));
        urls.push(format!("https://{host}"));
    }
    let urls: Vec<&str> = urls.iter().map(String::as_str).collect();

    let engine = SurveyEngine::new(
        Arc::new(client),
        EngineSettings {
            max_concurrency: 256,
            probe_timeout: Duration::from_secs(30),
            run_timeout: None,
            retry: RetryPolicy::none(),
        },
    );
    let shutdown = Shutdown::new();

    let summary = engine
        .run(
            &targets(&urls),
            RunLayout::new(out.path(), "2024-05-03"),
            shutdown.subscribe(),
        )
        .await
        .unwrap();

    let lines = report_lines(&summary.failure_report);
    assert_eq!(summary.total, TARGETS);
    assert_eq!(summary.failed, expected_failures);
    assert_eq!(lines.len(), expected_failures);
    assert_eq!(summary.succeeded, TARGETS - expected_failures);
    assert_eq!(artifact_count(&summary.output_dir), summary.succeeded);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_deadline_mid_run_accounts_for_every_target() {
    let out = tempfile::tempdir().unwrap();
    let mut rng = rand::thread_rng();
    let mut client = ScriptedClient::new(Script::Respond(alt_svc()));
    let mut urls = Vec::new();

    for i in 0..2_000 {
        let host = format!("d{i}.example");
        let delay = Duration::from_millis(rng.gen_range(0..400));
        client = client.with(&host, Script::Respond(alt_svc()).delayed(delay));
        urls.push(format!("https://{host}"));
    }
    let urls: Vec<&str> = urls.iter().map(String::as_str).collect();

    let engine = SurveyEngine::new(
        Arc::new(client),
        EngineSettings {
            max_concurrency: 128,
            probe_timeout: Duration::from_secs(30),
            run_timeout: Some(Duration::from_millis(250)),
            retry: RetryPolicy::none(),
        },
    );
    let shutdown = Shutdown::new();

    let summary = engine
        .run(
            &targets(&urls),
            RunLayout::new(out.path(), "2024-05-04"),
            shutdown.subscribe(),
        )
        .await
        .unwrap();

    let lines = report_lines(&summary.failure_report);
    assert!(summary.closed_early.is_some());
    assert_eq!(summary.succeeded + lines.len(), summary.total);
    assert_eq!(lines.len(), summary.expired);
    assert_eq!(artifact_count(&summary.output_dir), summary.succeeded);
}
