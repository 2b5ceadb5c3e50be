//! Merging of per-shard reports.

use std::collections::{HashMap, HashSet};

use super::model::{CanonicalReport, OutcomeCounts, Provenance, SchemaVersion, UrlOutcome};

/// Combines two shard reports into one.
///
/// Records are concatenated and re-deduplicated by `(url, location)`; every
/// dropped record is also removed from the counts so the accounting invariant
/// survives. Unique URLs are corrected for URLs listed by both sides, and the
/// merged report is degraded if either side is.
pub fn merge(left: CanonicalReport, right: CanonicalReport) -> CanonicalReport {
    let mut seen: HashSet<(String, _)> = left
        .records
        .iter()
        .map(|r| (r.url.clone(), r.location.clone()))
        .collect();
    let left_urls: HashSet<&str> = left.records.iter().map(|r| r.url.as_str()).collect();
    let shared_urls = right
        .records
        .iter()
        .map(|r| r.url.as_str())
        .collect::<HashSet<_>>()
        .intersection(&left_urls)
        .count();

    let mut counts = left.counts;
    counts.add(&right.counts);
    let mut total_urls = left.total_urls + right.total_urls;

    let mut records = left.records;
    for record in right.records {
        if seen.insert((record.url.clone(), record.location.clone())) {
            records.push(record);
            continue;
        }
        log::debug!(
            "Dropping record for {} at {} listed by more than one shard",
            record.url,
            record.location
        );
        let slot = match record.outcome {
            UrlOutcome::Ok => &mut counts.ok,
            UrlOutcome::Broken => &mut counts.broken,
            UrlOutcome::TimedOut => &mut counts.timed_out,
            UrlOutcome::Excluded => &mut counts.excluded,
        };
        *slot = slot.saturating_sub(1);
        total_urls = total_urls.saturating_sub(1);
    }

    let mut locations_per_url: HashMap<&str, usize> = HashMap::new();
    for record in &records {
        *locations_per_url.entry(record.url.as_str()).or_default() += 1;
    }
    let duplicate_urls = locations_per_url.values().filter(|&&n| n > 1).count();
    let unique_urls = (left.unique_urls + right.unique_urls)
        .saturating_sub(shared_urls)
        .max(locations_per_url.len());

    CanonicalReport {
        records,
        files_total: left.files_total + right.files_total,
        files_processed: left.files_processed + right.files_processed,
        total_urls,
        unique_urls,
        duplicate_urls,
        counts,
        status: merge_status(left.status, right.status),
        provenance: Provenance {
            schema: left.provenance.schema,
            degraded: left.provenance.degraded || right.provenance.degraded,
        },
    }
}

/// Merges any number of shard reports, in order.
///
/// An empty input yields an empty, trusted report.
pub fn merge_reports(reports: impl IntoIterator<Item = CanonicalReport>) -> CanonicalReport {
    reports
        .into_iter()
        .reduce(merge)
        .unwrap_or_else(empty_report)
}

fn empty_report() -> CanonicalReport {
    CanonicalReport {
        records: Vec::new(),
        files_total: 0,
        files_processed: 0,
        total_urls: 0,
        unique_urls: 0,
        duplicate_urls: 0,
        counts: OutcomeCounts::default(),
        status: None,
        provenance: Provenance::trusted(SchemaVersion::Rich),
    }
}

/// A non-success status on either side wins.
fn merge_status(left: Option<String>, right: Option<String>) -> Option<String> {
    match (left, right) {
        (Some(l), Some(r)) if l.eq_ignore_ascii_case("success") => Some(r),
        (Some(l), _) => Some(l),
        (None, r) => r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::normalize;

    fn shard(json: &str) -> CanonicalReport {
        normalize(json).unwrap()
    }

    #[test]
    fn test_merge_sums_counts() {
        let a = shard(
            r#"{"status":"failure","urls":{"total_found":50,"unique":40},"files":{"total":3,"processed":2},
               "issues":[{"url":"https://a.io","file":"a.md","line":1,"status_code":404}]}"#,
        );
        let b = shard(
            r#"{"status":"success","urls":{"total_found":30,"unique":25},"files":{"total":2,"processed":2},
               "issues":[]}"#,
        );
        let merged = merge_reports([a, b]);
        assert_eq!(merged.total_urls(), 80);
        assert_eq!(merged.unique_urls(), 65);
        assert_eq!(merged.counts().broken, 1);
        assert_eq!(merged.counts().ok, 79);
        assert_eq!(merged.files_total(), 5);
        assert_eq!(merged.files_processed(), 4);
        assert_eq!(merged.status(), Some("failure"));
        assert_eq!(merged.counts().total(), merged.total_urls());
    }

    #[test]
    fn test_merge_corrects_cross_shard_duplicates() {
        let a = shard(
            r#"{"issues":[{"url":"https://a.io","file":"a.md","line":1,"status_code":404}]}"#,
        );
        let b = shard(
            r#"{"issues":[
                {"url":"https://a.io","file":"a.md","line":1,"status_code":404},
                {"url":"https://a.io","file":"b.md","line":4,"status_code":404}]}"#,
        );
        let merged = merge_reports([a, b]);
        assert_eq!(merged.records().len(), 2);
        assert_eq!(merged.counts().broken, 2);
        assert_eq!(merged.total_urls(), 2);
        assert_eq!(merged.unique_urls(), 1);
        assert_eq!(merged.duplicate_urls(), 1);
    }

    #[test]
    fn test_merge_propagates_degraded() {
        let a = shard(r#"{"issues":[]}"#);
        let b = shard("https://x.io/missing 404 README.md:2");
        assert!(b.is_degraded());
        let merged = merge_reports([a, b]);
        assert!(merged.is_degraded());
        assert_eq!(merged.counts().broken, 1);
    }

    #[test]
    fn test_merge_nothing() {
        let merged = merge_reports(Vec::new());
        assert_eq!(merged.total_urls(), 0);
        assert!(!merged.is_degraded());
    }
}
