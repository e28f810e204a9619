//! h3-survey
//!
//! Probes a list of websites over HTTP/3 and records which ones answer.
//!
//! # Architecture Overview
//!
//! ```text
//!   host list ──▶ targets ──▶ engine::dispatcher ──▶ probe::Http3Client (× N)
//!                                     │
//!                     ┌───────────────┴───────────────┐
//!                     ▼                               ▼
//!            report::artifact                 engine::ledger
//!          header-<host>.txt                (first failure wins)
//!                     │                               │
//!                     └──────────▶ engine::barrier ◀──┘
//!                                        │
//!                                        ▼
//!                              report::failure
//!                   no-quic-implementation-<date>.txt
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use h3_survey::config::{load_config, validate_config, ConfigError, SurveyConfig};
use h3_survey::engine::{EngineSettings, SurveyEngine};
use h3_survey::lifecycle::{signals, Shutdown};
use h3_survey::observability::{logging, metrics};
use h3_survey::probe::Http3Client;
use h3_survey::report::RunLayout;
use h3_survey::targets::load_targets;

#[derive(Parser, Debug)]
#[command(name = "h3-survey", version)]
#[command(about = "Probe websites for HTTP/3 support and record their response headers")]
struct Cli {
    /// Host list: `rank,domain` CSV rows or one URL per line.
    #[arg(short, long)]
    targets: PathBuf,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output root; the run writes into <output>/<date>.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum probes in flight (0 = unbounded).
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-probe timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Overall run deadline in seconds (0 = none).
    #[arg(long)]
    run_timeout_secs: Option<u64>,

    /// Extra attempts for connect errors and timeouts.
    #[arg(long)]
    retries: Option<u32>,

    /// Probe only the first N targets.
    #[arg(long)]
    limit: Option<usize>,

    /// Run date used for directory and report names (YYYY-MM-DD).
    #[arg(long)]
    date: Option<String>,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<SurveyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SurveyConfig::default(),
        };

        if let Some(output) = &self.output {
            config.output.root = output.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.probe.max_concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout_secs {
            config.probe.timeout_secs = timeout;
        }
        if let Some(run_timeout) = self.run_timeout_secs {
            config.probe.run_timeout_secs = run_timeout;
        }
        if let Some(retries) = self.retries {
            config.retries.max_retries = retries;
        }
        if let Some(limit) = self.limit {
            config.targets.limit = Some(limit);
        }
        if let Some(date) = &self.date {
            config.output.run_date = Some(date.clone());
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init(&config.observability.log_level);
    tracing::info!("h3-survey v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let targets = load_targets(&cli.targets, &config.targets)?;

    let layout = match &config.output.run_date {
        Some(date) => RunLayout::new(&config.output.root, date.clone()),
        None => RunLayout::for_today(&config.output.root),
    };

    let client = Arc::new(Http3Client::new(&config.probe)?);
    let engine = SurveyEngine::new(client, EngineSettings::from(&config));

    let shutdown = Shutdown::new();
    let listener = signals::spawn_interrupt_listener(shutdown.clone());

    let summary = engine.run(&targets, layout, shutdown.subscribe()).await?;
    listener.abort();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} targets: {} answered over HTTP/3, {} failed ({} local errors, {} unsettled). Report: {}",
            summary.total,
            summary.succeeded,
            summary.failed,
            summary.local_errors,
            summary.expired,
            summary.failure_report.display(),
        );
    }
    Ok(())
}
