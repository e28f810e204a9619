//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI flag overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → SurveyConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - Config is read once per run; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ObservabilityConfig, OutputConfig, ProbeConfig, RetryConfig, SurveyConfig, TargetsConfig,
};
pub use validation::{validate_config, ValidationError};
