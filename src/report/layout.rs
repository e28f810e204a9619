//! On-disk layout of one run.
//!
//! ```text
//! <root>/<date>/
//!     header-<host>.txt                    one per successful target
//!     no-quic-implementation-<date>.txt    failure report
//! ```

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::report::ReportError;
use crate::targets::Target;

/// Paths for one run's output.
#[derive(Debug, Clone)]
pub struct RunLayout {
    dir: PathBuf,
    date: String,
}

impl RunLayout {
    /// Layout under `root` for an explicit date (`YYYY-MM-DD`).
    pub fn new(root: &Path, date: impl Into<String>) -> Self {
        let date = date.into();
        Self {
            dir: root.join(&date),
            date,
        }
    }

    /// Layout under `root` for the local date today.
    pub fn for_today(root: &Path) -> Self {
        Self::new(root, chrono::Local::now().format("%Y-%m-%d").to_string())
    }

    /// Create the run directory.
    pub async fn create(&self) -> Result<(), ReportError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ReportError::CreateDir {
                path: self.dir.clone(),
                source,
            })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn artifact_path(&self, target: &Target) -> PathBuf {
        self.dir.join(format!("header-{}.txt", artifact_host(target)))
    }

    pub fn failure_report_path(&self) -> PathBuf {
        self.dir
            .join(format!("no-quic-implementation-{}.txt", self.date))
    }
}

/// Host part used in artifact names: the target host without a `www.` label.
pub fn artifact_host(target: &Target) -> &str {
    let host = target.host();
    host.strip_prefix("www.").unwrap_or(host)
}

/// Write through a uniquely named sibling and rename it into place, so
/// readers and concurrent writers never observe a partial file.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    let tmp = path.with_file_name(tmp_name);

    tokio::fs::write(&tmp, contents).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}
