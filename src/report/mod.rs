//! Report emission subsystem.
//!
//! # Data Flow
//! ```text
//! During the run (one probe task per write):
//!     Success → artifact.rs → header-<host>.txt
//!
//! After the completion barrier releases:
//!     FailureLedger snapshot → failure.rs → no-quic-implementation-<date>.txt
//! ```
//!
//! # Design Decisions
//! - Every file is written to a temporary sibling and renamed into place
//! - The failure report is sorted so identical ledgers give identical bytes

use std::path::PathBuf;

pub mod artifact;
pub mod failure;
pub mod layout;

pub use artifact::{render_headers, ArtifactWriter};
pub use failure::{render_failure_report, write_failure_report};
pub use layout::{artifact_host, RunLayout};

/// Error type for output operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("cannot create run directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
