//! Per-host success artifacts.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashSet;

use crate::probe::HeaderFields;
use crate::report::layout::{write_atomic, RunLayout};
use crate::report::ReportError;
use crate::targets::Target;

/// Render headers as `Name : [value1 value2]` lines.
pub fn render_headers(headers: &HeaderFields) -> String {
    let mut out = String::new();
    for (name, values) in headers {
        out.push_str(name);
        out.push_str(" : [");
        out.push_str(&values.join(" "));
        out.push_str("]\n");
    }
    out
}

/// Writes success artifacts into the run directory.
///
/// Two targets that derive the same file name (e.g. `https://x.com` and
/// `https://www.x.com`) resolve last-writer-wins; the collision is logged.
#[derive(Debug)]
pub struct ArtifactWriter {
    layout: Arc<RunLayout>,
    written: DashSet<PathBuf>,
}

impl ArtifactWriter {
    pub fn new(layout: Arc<RunLayout>) -> Self {
        Self {
            layout,
            written: DashSet::new(),
        }
    }

    /// Write one target's headers. Returns the artifact path.
    pub async fn write(&self, target: &Target, headers: &HeaderFields) -> Result<PathBuf, ReportError> {
        let path = self.layout.artifact_path(target);
        if !self.written.insert(path.clone()) {
            tracing::warn!(
                url = %target,
                path = %path.display(),
                "Artifact name collision, last writer wins"
            );
        }

        write_atomic(&path, render_headers(headers).as_bytes())
            .await
            .map_err(|source| ReportError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}
