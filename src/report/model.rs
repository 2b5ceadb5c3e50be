//! Canonical report data model.

use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;

/// Result of checking one URL occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIterMacro)]
#[serde(rename_all = "kebab-case")]
pub enum UrlOutcome {
    /// The URL responded successfully
    Ok,
    /// The URL responded with an error status or failed at connection level
    Broken,
    /// The request timed out
    TimedOut,
    /// The URL was skipped by an allowlist or exclude pattern
    Excluded,
}

impl UrlOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlOutcome::Ok => "ok",
            UrlOutcome::Broken => "broken",
            UrlOutcome::TimedOut => "timed-out",
            UrlOutcome::Excluded => "excluded",
        }
    }
}

impl std::fmt::Display for UrlOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a URL occurrence was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceLocation {
    /// File path as reported by the checker
    pub file: String,
    /// 1-based line number, when known
    pub line: Option<u32>,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => f.write_str(&self.file),
        }
    }
}

/// One URL occurrence and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlRecord {
    /// The URL as written in the source
    pub url: String,
    /// Where it was found
    pub location: SourceLocation,
    /// What happened when it was checked
    pub outcome: UrlOutcome,
    /// HTTP status code, when the server answered
    pub status_code: Option<u16>,
    /// Error description, when the checker gave one
    pub error: Option<String>,
}

impl UrlRecord {
    /// Host part of the URL, lowercased, if the URL parses.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_matches(['[', ']']).to_ascii_lowercase()))
    }
}

/// Per-outcome occurrence counts.
///
/// `ok + broken + timed_out + excluded` always equals the report's total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub ok: usize,
    pub broken: usize,
    pub timed_out: usize,
    pub excluded: usize,
}

impl OutcomeCounts {
    pub fn total(&self) -> usize {
        self.ok + self.broken + self.timed_out + self.excluded
    }

    pub(crate) fn add(&mut self, other: &OutcomeCounts) {
        self.ok += other.ok;
        self.broken += other.broken;
        self.timed_out += other.timed_out;
        self.excluded += other.excluded;
    }
}

/// Raw-output shapes the normalizer understands, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIterMacro)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaVersion {
    /// `urls`/`files` summary blocks plus `issues[]`
    Rich,
    /// `status` plus `issues[]`
    Issues,
    /// Legacy `failed_urls[]`
    FailedUrls,
    /// Legacy `results[]` listing every checked URL
    Results,
    /// Best-effort line scan of non-JSON output
    TextScan,
}

impl SchemaVersion {
    /// Structured schemas in the order they are tried.
    pub const STRUCTURED: [SchemaVersion; 4] = [
        SchemaVersion::Rich,
        SchemaVersion::Issues,
        SchemaVersion::FailedUrls,
        SchemaVersion::Results,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVersion::Rich => "rich",
            SchemaVersion::Issues => "issues",
            SchemaVersion::FailedUrls => "failed-urls",
            SchemaVersion::Results => "results",
            SchemaVersion::TextScan => "text-scan",
        }
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a report was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Schema that produced the report
    pub schema: SchemaVersion,
    /// `true` when the report came from best-effort parsing and its statistics
    /// deserve lower confidence
    pub degraded: bool,
}

impl Provenance {
    pub fn trusted(schema: SchemaVersion) -> Self {
        Self {
            schema,
            degraded: false,
        }
    }

    pub fn degraded(schema: SchemaVersion) -> Self {
        Self {
            schema,
            degraded: true,
        }
    }
}

/// Normalized, schema-independent findings of one run.
///
/// Built once by [`ReportBuilder`](super::ReportBuilder) and never mutated.
/// Records are unique per `(url, location)`; `duplicate_urls` counts URL
/// strings that occur at more than one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalReport {
    pub(crate) records: Vec<UrlRecord>,
    pub(crate) files_total: usize,
    pub(crate) files_processed: usize,
    pub(crate) total_urls: usize,
    pub(crate) unique_urls: usize,
    pub(crate) duplicate_urls: usize,
    pub(crate) counts: OutcomeCounts,
    pub(crate) status: Option<String>,
    pub(crate) provenance: Provenance,
}

impl CanonicalReport {
    /// Records in checker order.
    pub fn records(&self) -> &[UrlRecord] {
        &self.records
    }

    /// Records that did not pass.
    pub fn failing_records(&self) -> impl Iterator<Item = &UrlRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, UrlOutcome::Broken | UrlOutcome::TimedOut))
    }

    pub fn files_total(&self) -> usize {
        self.files_total
    }

    /// Files that contained at least one candidate URL.
    pub fn files_processed(&self) -> usize {
        self.files_processed
    }

    /// Total URL occurrences found.
    pub fn total_urls(&self) -> usize {
        self.total_urls
    }

    pub fn unique_urls(&self) -> usize {
        self.unique_urls
    }

    /// URL strings seen at more than one location.
    pub fn duplicate_urls(&self) -> usize {
        self.duplicate_urls
    }

    pub fn counts(&self) -> OutcomeCounts {
        self.counts
    }

    /// Status string reported by the checker, if any.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is_degraded(&self) -> bool {
        self.provenance.degraded
    }
}
