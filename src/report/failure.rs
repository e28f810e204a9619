//! Consolidated failure report.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::report::layout::{write_atomic, RunLayout};
use crate::report::ReportError;

/// Render ledger entries as `target , reason` lines, sorted by target.
///
/// Line breaks inside a reason are escaped so every entry stays on one line;
/// backslashes are escaped too, so the reason can be recovered exactly.
pub fn render_failure_report(entries: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (target, reason) in entries {
        out.push_str(target);
        out.push_str(" , ");
        out.push_str(&escape_reason(reason));
        out.push('\n');
    }
    out
}

/// Write the report for a finished run. Returns the report path.
pub async fn write_failure_report(
    layout: &RunLayout,
    entries: &BTreeMap<String, String>,
) -> Result<PathBuf, ReportError> {
    let path = layout.failure_report_path();
    write_atomic(&path, render_failure_report(entries).as_bytes())
        .await
        .map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;

    tracing::info!(path = %path.display(), entries = entries.len(), "Failure report written");
    Ok(path)
}

fn escape_reason(reason: &str) -> Cow<'_, str> {
    if !reason.contains(['\\', '\n', '\r']) {
        return Cow::Borrowed(reason);
    }
    let mut escaped = String::with_capacity(reason.len() + 8);
    for ch in reason.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(t, r)| (t.to_string(), r.to_string()))
            .collect()
    }

    #[test]
    fn test_render_lines() {
        let report = render_failure_report(&entries(&[
            ("https://b.example", "connection refused"),
            ("https://a.example", "timeout: no response after 10000ms"),
        ]));
        assert_eq!(
            report,
            "https://a.example , timeout: no response after 10000ms\n\
             https://b.example , connection refused\n"
        );
    }

    #[test]
    fn test_render_is_repeatable() {
        let snapshot = entries(&[("https://x.example", "a, b"), ("https://y.example", "c")]);
        assert_eq!(render_failure_report(&snapshot), render_failure_report(&snapshot));
    }

    #[test]
    fn test_reason_keeps_commas_and_escapes_newlines() {
        let report = render_failure_report(&entries(&[(
            "https://a.example",
            "handshake failed, alert 40\nretry later",
        )]));
        assert_eq!(
            report,
            "https://a.example , handshake failed, alert 40\\nretry later\n"
        );
        assert_eq!(report.lines().count(), 1);
    }

    #[test]
    fn test_literal_backslash_n_differs_from_line_break() {
        let report = render_failure_report(&entries(&[
            ("https://a.example", "bad path C:\\new"),
            ("https://b.example", "bad path C:\nnew"),
        ]));
        assert_eq!(
            report,
            "https://a.example , bad path C:\\\\new\n\
             https://b.example , bad path C:\\nnew\n"
        );
    }

    #[test]
    fn test_empty_report() {
        assert_eq!(render_failure_report(&BTreeMap::new()), "");
    }
}
