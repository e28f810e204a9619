//! HTTP/3 support survey library.

pub mod config;
pub mod engine;
pub mod lifecycle;
pub mod observability;
pub mod probe;
pub mod report;
pub mod resilience;
pub mod targets;

pub use config::SurveyConfig;
pub use engine::{EngineSettings, RunSummary, SurveyEngine};
pub use lifecycle::Shutdown;
pub use probe::{ProbeClient, ProbeOutcome};
pub use report::RunLayout;
pub use targets::Target;
