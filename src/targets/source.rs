//! Host list loading.
//!
//! Accepts either a ranked site list (`rank,domain` rows, as in the common
//! top-1M CSVs) or plain URLs, one per line. Both may be mixed in one file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::config::TargetsConfig;
use crate::targets::target::{Target, TargetError};

const BOM: char = '\u{feff}';

/// Load targets from a file on disk.
pub fn load_targets(path: &Path, config: &TargetsConfig) -> Result<Vec<Target>, TargetError> {
    let content = fs::read_to_string(path)?;
    let targets = parse_targets(&content, config)?;
    tracing::info!(path = %path.display(), count = targets.len(), "Targets loaded");
    Ok(targets)
}

/// Parse a host list. Duplicates are dropped, keeping the first occurrence.
///
/// Only the first record may be a header; a later row without a numeric
/// rank is an error rather than a skipped line.
pub fn parse_targets(content: &str, config: &TargetsConfig) -> Result<Vec<Target>, TargetError> {
    let limit = config.limit.unwrap_or(usize::MAX);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());

    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    let mut duplicates = 0usize;
    let mut first_record = true;
    let mut record = StringRecord::new();

    while targets.len() < limit && reader.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line() as usize);
        let is_first = std::mem::replace(&mut first_record, false);

        let url = match record_to_url(&record, &config.url_prefix) {
            Ok(Some(url)) => url,
            Ok(None) => continue,
            Err(_) if is_first => {
                tracing::debug!(line, "Skipping header row");
                continue;
            }
            Err(e) => {
                return Err(TargetError::Line {
                    line,
                    source: Box::new(e),
                })
            }
        };
        let target = Target::parse(&url).map_err(|e| TargetError::Line {
            line,
            source: Box::new(e),
        })?;
        if seen.insert(target.as_str().to_string()) {
            targets.push(target);
        } else {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        tracing::warn!(duplicates, "Dropped duplicate targets");
    }
    Ok(targets)
}

/// Turn one record into a URL. `None` for blank records; an error for a
/// ranked row whose rank is not a number.
fn record_to_url(record: &StringRecord, prefix: &str) -> Result<Option<String>, TargetError> {
    let first = record.get(0).unwrap_or_default().trim_start_matches(BOM);
    if first.starts_with("https://") || first.starts_with("http://") {
        // A URL may itself contain commas.
        let fields: Vec<&str> = record.iter().collect();
        return Ok(Some(fields.join(",").trim_start_matches(BOM).to_string()));
    }

    match record.get(1) {
        Some(domain) => {
            if first.parse::<u64>().is_err() {
                return Err(TargetError::BadRank(first.to_string()));
            }
            Ok((!domain.is_empty()).then(|| format!("{prefix}{domain}")))
        }
        None => Ok((!first.is_empty()).then(|| format!("{prefix}{first}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TargetsConfig {
        TargetsConfig::default()
    }

    fn strings(targets: &[Target]) -> Vec<&str> {
        targets.iter().map(Target::as_str).collect()
    }

    #[test]
    fn test_ranked_csv_with_header() {
        let csv = "rank,site\n1,google.com\n2,youtube.com\n";
        let targets = parse_targets(csv, &config()).unwrap();
        assert_eq!(
            strings(&targets),
            vec!["https://www.google.com", "https://www.youtube.com"]
        );
    }

    #[test]
    fn test_plain_urls_and_comments() {
        let list = "# seed list\nhttps://a.example\n\n  https://b.example  \n";
        let targets = parse_targets(list, &config()).unwrap();
        assert_eq!(strings(&targets), vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_bare_domains_get_prefix() {
        let mut config = config();
        config.url_prefix = "https://".into();
        let targets = parse_targets("cloudflare.com\n", &config).unwrap();
        assert_eq!(strings(&targets), vec!["https://cloudflare.com"]);
    }

    #[test]
    fn test_duplicates_and_limit() {
        let mut config = config();
        config.limit = Some(2);
        let csv = "1,a.example\n2,a.example\n3,b.example\n4,c.example\n";
        let targets = parse_targets(csv, &config).unwrap();
        assert_eq!(
            strings(&targets),
            vec!["https://www.a.example", "https://www.b.example"]
        );
    }

    #[test]
    fn test_quoted_rank_is_kept() {
        let csv = "rank,site\n\"1\",google.com\n2,\"youtube.com\"\n";
        let targets = parse_targets(csv, &config()).unwrap();
        assert_eq!(
            strings(&targets),
            vec!["https://www.google.com", "https://www.youtube.com"]
        );
    }

    #[test]
    fn test_bom_prefixed_first_row_is_data() {
        let csv = "\u{feff}1,google.com\n2,youtube.com\n";
        let targets = parse_targets(csv, &config()).unwrap();
        assert_eq!(
            strings(&targets),
            vec!["https://www.google.com", "https://www.youtube.com"]
        );
    }

    #[test]
    fn test_non_numeric_rank_after_first_row_is_an_error() {
        let csv = "1,google.com\nx,youtube.com\n3,facebook.com\n";
        let err = parse_targets(csv, &config()).unwrap_err();
        assert!(
            matches!(&err, TargetError::Line { line: 2, source } if matches!(**source, TargetError::BadRank(_))),
            "{err}"
        );
    }

    #[test]
    fn test_url_with_comma_survives() {
        let targets = parse_targets("https://a.example/?q=1,2\n", &config()).unwrap();
        assert_eq!(strings(&targets), vec!["https://a.example/?q=1,2"]);
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let err = parse_targets("https://ok.example\nhttps://\n", &config()).unwrap_err();
        assert!(err.to_string().starts_with("line 2:"), "{err}");
    }
}
