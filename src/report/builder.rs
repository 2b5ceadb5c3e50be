//! Canonical report construction.
//!
//! Every parse strategy feeds records and whatever summary figures it found
//! into a [`ReportBuilder`], which deduplicates records and derives the counts
//! so that the accounting invariant holds no matter how incomplete the input.

use std::collections::{HashMap, HashSet};

use super::model::{CanonicalReport, OutcomeCounts, Provenance, SourceLocation, UrlOutcome, UrlRecord};

/// Summary figures a schema may or may not carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    /// Checker status string (`success`, `failure`, ...)
    pub status: Option<String>,
    /// Total URL occurrences found
    pub total_found: Option<usize>,
    /// Unique URL strings
    pub unique: Option<usize>,
    /// Occurrences skipped by allowlist or exclude pattern
    pub excluded: Option<usize>,
    /// Failure count (broken and timed out) announced in free text
    /// (degraded parsing only)
    pub broken_hint: Option<usize>,
    pub files_total: Option<usize>,
    pub files_processed: Option<usize>,
}

/// Accumulates records and summary figures into a [`CanonicalReport`].
#[derive(Debug)]
pub struct ReportBuilder {
    provenance: Provenance,
    records: Vec<UrlRecord>,
    seen: HashSet<(String, SourceLocation)>,
    summary: ReportSummary,
}

impl ReportBuilder {
    pub fn new(provenance: Provenance) -> Self {
        Self {
            provenance,
            records: Vec::new(),
            seen: HashSet::new(),
            summary: ReportSummary::default(),
        }
    }

    /// Adds a record unless one with the same URL and location already exists.
    ///
    /// Returns `false` for a dropped duplicate.
    pub fn push(&mut self, record: UrlRecord) -> bool {
        let key = (record.url.clone(), record.location.clone());
        if !self.seen.insert(key) {
            log::debug!(
                "Dropping duplicate record for {} at {}",
                record.url,
                record.location
            );
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = UrlRecord>) {
        for record in records {
            self.push(record);
        }
    }

    pub fn summary(mut self, summary: ReportSummary) -> Self {
        self.summary = summary;
        self
    }

    pub fn build(self) -> CanonicalReport {
        let ReportBuilder {
            provenance,
            records,
            summary,
            ..
        } = self;

        let mut listed = OutcomeCounts::default();
        for record in &records {
            match record.outcome {
                UrlOutcome::Ok => listed.ok += 1,
                UrlOutcome::Broken => listed.broken += 1,
                UrlOutcome::TimedOut => listed.timed_out += 1,
                UrlOutcome::Excluded => listed.excluded += 1,
            }
        }

        // The announced failure count covers timeouts too; only the part not
        // accounted for by listed records is attributed to broken.
        let shortfall = summary
            .broken_hint
            .unwrap_or(0)
            .saturating_sub(listed.broken + listed.timed_out);
        let broken = listed.broken + shortfall;
        let timed_out = listed.timed_out;
        let excluded = listed.excluded.max(summary.excluded.unwrap_or(0));
        let not_ok = broken + timed_out + excluded;

        // Schemas that only list failures leave the ok count implicit; the
        // announced total can never be lower than what was actually listed.
        let total = summary
            .total_found
            .unwrap_or(0)
            .max(not_ok + listed.ok);
        let counts = OutcomeCounts {
            ok: total - not_ok,
            broken,
            timed_out,
            excluded,
        };

        let mut locations_per_url: HashMap<&str, usize> = HashMap::new();
        for record in &records {
            *locations_per_url.entry(record.url.as_str()).or_default() += 1;
        }
        let listed_unique = locations_per_url.len();
        let duplicate_urls = locations_per_url.values().filter(|&&n| n > 1).count();
        let unique_urls = summary.unique.map_or(listed_unique, |u| u.max(listed_unique));

        CanonicalReport {
            records,
            files_total: summary.files_total.unwrap_or(0),
            files_processed: summary.files_processed.unwrap_or(0),
            total_urls: total,
            unique_urls,
            duplicate_urls,
            counts,
            status: summary.status,
            provenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::SchemaVersion;

    fn record(url: &str, file: &str, line: u32, outcome: UrlOutcome) -> UrlRecord {
        UrlRecord {
            url: url.to_string(),
            location: SourceLocation::new(file, Some(line)),
            outcome,
            status_code: None,
            error: None,
        }
    }

    fn builder() -> ReportBuilder {
        ReportBuilder::new(Provenance::trusted(SchemaVersion::Issues))
    }

    #[test]
    fn test_deduplicates_by_url_and_location() {
        let mut b = builder();
        assert!(b.push(record("https://a.com", "README.md", 1, UrlOutcome::Broken)));
        assert!(!b.push(record("https://a.com", "README.md", 1, UrlOutcome::Broken)));
        assert!(b.push(record("https://a.com", "README.md", 2, UrlOutcome::Broken)));
        assert!(b.push(record("https://a.com", "docs/x.md", 1, UrlOutcome::Broken)));
        assert!(b.push(record("https://b.com", "README.md", 1, UrlOutcome::Broken)));
        let report = b.build();

        assert_eq!(report.records().len(), 4);
        assert_eq!(report.unique_urls(), 2);
        assert_eq!(report.duplicate_urls(), 1);
        assert_eq!(report.counts().broken, 4);
        assert_eq!(report.total_urls(), 4);
    }

    #[test]
    fn test_implicit_ok_count_from_total() {
        let mut b = builder().summary(ReportSummary {
            total_found: Some(100),
            ..Default::default()
        });
        b.extend([
            record("https://a.com", "a.md", 1, UrlOutcome::Broken),
            record("https://b.com", "a.md", 2, UrlOutcome::TimedOut),
        ]);
        let report = b.build();
        let counts = report.counts();
        assert_eq!(counts.ok, 98);
        assert_eq!(counts.broken, 1);
        assert_eq!(counts.timed_out, 1);
        assert_eq!(counts.total(), report.total_urls());
    }

    #[test]
    fn test_total_never_below_listed_records() {
        let mut b = builder().summary(ReportSummary {
            total_found: Some(1),
            excluded: Some(2),
            ..Default::default()
        });
        b.extend([
            record("https://a.com", "a.md", 1, UrlOutcome::Broken),
            record("https://b.com", "a.md", 2, UrlOutcome::Broken),
        ]);
        let report = b.build();
        assert_eq!(report.total_urls(), 4);
        assert_eq!(report.counts().ok, 0);
        assert_eq!(report.counts().excluded, 2);
        assert_eq!(report.counts().total(), report.total_urls());
    }

    #[test]
    fn test_reported_unique_is_kept_when_consistent() {
        let mut b = builder().summary(ReportSummary {
            total_found: Some(12),
            unique: Some(10),
            ..Default::default()
        });
        b.push(record("https://a.com", "a.md", 1, UrlOutcome::Broken));
        assert_eq!(b.build().unique_urls(), 10);
    }

    #[test]
    fn test_broken_hint_raises_broken_count() {
        let mut b = ReportBuilder::new(Provenance::degraded(SchemaVersion::TextScan)).summary(
            ReportSummary {
                total_found: Some(10),
                broken_hint: Some(3),
                ..Default::default()
            },
        );
        b.push(record("https://a.com", "a.md", 1, UrlOutcome::Broken));
        let report = b.build();
        assert_eq!(report.counts().broken, 3);
        assert_eq!(report.counts().ok, 7);
        assert!(report.is_degraded());
    }

    #[test]
    fn test_broken_hint_includes_listed_timeouts() {
        let mut b = ReportBuilder::new(Provenance::degraded(SchemaVersion::TextScan)).summary(
            ReportSummary {
                total_found: Some(10),
                broken_hint: Some(3),
                ..Default::default()
            },
        );
        b.extend([
            record("https://a.com", "a.md", 1, UrlOutcome::Broken),
            record("https://b.com", "a.md", 2, UrlOutcome::Broken),
            record("https://c.com", "a.md", 3, UrlOutcome::TimedOut),
        ]);
        let counts = b.build().counts();
        assert_eq!(counts.broken, 2);
        assert_eq!(counts.timed_out, 1);
        assert_eq!(counts.ok, 7);
    }

    #[test]
    fn test_empty_report() {
        let report = builder().build();
        assert_eq!(report.total_urls(), 0);
        assert_eq!(report.unique_urls(), 0);
        assert_eq!(report.counts(), OutcomeCounts::default());
        assert!(report.records().is_empty());
    }
}
