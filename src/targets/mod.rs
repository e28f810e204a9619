//! Host list subsystem.
//!
//! # Data Flow
//! ```text
//! host list file (ranked CSV or URLs)
//!     → source.rs (CSV records, prefixing, de-duplication, limit)
//!     → target.rs (URL validation)
//!     → Vec<Target> handed to the engine
//! ```
//!
//! # Design Decisions
//! - Fetching and unpacking remote site lists is left to the operator
//! - Malformed lines fail the whole load; the engine never sees bad URLs

pub mod source;
pub mod target;

pub use source::{load_targets, parse_targets};
pub use target::{Target, TargetError};
