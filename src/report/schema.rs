//! Structured checker output schemas.
//!
//! Each [`SchemaVersion`] is a pure parse function from a JSON value to a
//! [`ParsedReport`]. A schema matches when its required fields are present with
//! the right shape; unknown fields are ignored. New checker versions get a new
//! variant rather than field-presence checks spread through the code.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::builder::ReportSummary;
use super::model::{CanonicalReport, SchemaVersion, SourceLocation, UrlOutcome, UrlRecord};

/// Schema-independent intermediate form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReport {
    pub records: Vec<UrlRecord>,
    pub summary: ReportSummary,
}

/// Accepts a number, a numeric string, or null.
fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| T::try_from(n).ok()),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(|n| T::try_from(n).ok()),
        _ => None,
    })
}

/// Accepts a string or null; anything else is treated as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() && s != "null" => Some(s),
        _ => None,
    })
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    #[serde(default, deserialize_with = "lenient_string")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    file: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    line: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    status_code: Option<u16>,
    #[serde(default, deserialize_with = "lenient_string")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    error: Option<String>,
}

impl RawIssue {
    fn into_record(self) -> Option<UrlRecord> {
        let url = self.url?;
        let error = self.description.or(self.error);
        Some(UrlRecord {
            outcome: failure_outcome(self.status_code, error.as_deref()),
            location: SourceLocation::new(self.file.unwrap_or_default(), self.line),
            url,
            status_code: self.status_code,
            error,
        })
    }
}

/// Whether error text describes a timeout.
pub(crate) fn is_timeout_text(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    ["timed out", "timeout", "time out", "deadline exceeded"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// Outcome of an entry known to have failed.
fn failure_outcome(status_code: Option<u16>, error: Option<&str>) -> UrlOutcome {
    match (status_code, error) {
        (None, Some(text)) if is_timeout_text(text) => UrlOutcome::TimedOut,
        _ => UrlOutcome::Broken,
    }
}

#[derive(Debug, Default, Deserialize)]
struct RichUrls {
    #[serde(default, deserialize_with = "lenient_number")]
    total_found: Option<usize>,
    #[serde(default, deserialize_with = "lenient_number")]
    unique: Option<usize>,
    #[serde(default, deserialize_with = "lenient_number")]
    validated: Option<usize>,
    #[serde(default, deserialize_with = "lenient_number")]
    excluded: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RichFiles {
    #[serde(default, deserialize_with = "lenient_number")]
    total: Option<usize>,
    #[serde(default, deserialize_with = "lenient_number")]
    processed: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RichReport {
    #[serde(default, deserialize_with = "lenient_string")]
    status: Option<String>,
    urls: RichUrls,
    #[serde(default)]
    files: RichFiles,
    issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct IssuesReport {
    #[serde(default, deserialize_with = "lenient_string")]
    status: Option<String>,
    issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct FailedUrlsReport {
    #[serde(default, deserialize_with = "lenient_string")]
    status: Option<String>,
    failed_urls: Vec<RawIssue>,
}

#[derive(Debug, Default, Deserialize)]
struct RawLocation {
    #[serde(default, deserialize_with = "lenient_string")]
    file: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    line: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawResultDetail {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default, deserialize_with = "lenient_number")]
    status_code: Option<u16>,
    #[serde(default, deserialize_with = "lenient_string")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(default, deserialize_with = "lenient_string")]
    url: Option<String>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    excluded: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    file: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    line: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    status_code: Option<u16>,
    #[serde(default, deserialize_with = "lenient_string")]
    error: Option<String>,
    #[serde(default)]
    location: Option<RawLocation>,
    #[serde(default)]
    result: Option<RawResultDetail>,
}

impl RawResult {
    fn into_record(self) -> Option<UrlRecord> {
        let url = self.url?;
        let location = self.location.unwrap_or_default();
        let detail = self.result.unwrap_or_default();

        let file = location.file.or(self.file).unwrap_or_default();
        let line = location.line.or(self.line);
        let status_code = detail.status_code.or(self.status_code);
        let error = detail.error.or(self.error);

        let failed = self.success == Some(false) || detail.success == Some(false);
        let outcome = if self.excluded == Some(true) {
            UrlOutcome::Excluded
        } else if failed {
            failure_outcome(status_code, error.as_deref())
        } else {
            UrlOutcome::Ok
        };

        Some(UrlRecord {
            url,
            location: SourceLocation::new(file, line),
            outcome,
            status_code,
            error,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ResultsReport {
    #[serde(default, deserialize_with = "lenient_string")]
    status: Option<String>,
    results: Vec<RawResult>,
}

fn issues_to_records(issues: Vec<RawIssue>) -> Vec<UrlRecord> {
    issues.into_iter().filter_map(RawIssue::into_record).collect()
}

impl SchemaVersion {
    /// Parses `value` under this schema, or returns `None` if it does not match.
    pub fn parse(&self, value: &Value) -> Option<ParsedReport> {
        match self {
            SchemaVersion::Rich => {
                let raw = RichReport::deserialize(value).ok()?;
                let urls = raw.urls;
                Some(ParsedReport {
                    records: issues_to_records(raw.issues),
                    summary: ReportSummary {
                        status: raw.status,
                        total_found: urls.total_found.or(urls.validated).or(urls.unique),
                        unique: urls.unique,
                        excluded: urls.excluded,
                        broken_hint: None,
                        files_total: raw.files.total,
                        files_processed: raw.files.processed,
                    },
                })
            }
            SchemaVersion::Issues => {
                let raw = IssuesReport::deserialize(value).ok()?;
                Some(ParsedReport {
                    records: issues_to_records(raw.issues),
                    summary: ReportSummary {
                        status: raw.status,
                        ..Default::default()
                    },
                })
            }
            SchemaVersion::FailedUrls => {
                let raw = FailedUrlsReport::deserialize(value).ok()?;
                Some(ParsedReport {
                    records: issues_to_records(raw.failed_urls),
                    summary: ReportSummary {
                        status: raw.status,
                        ..Default::default()
                    },
                })
            }
            SchemaVersion::Results => {
                let raw = ResultsReport::deserialize(value).ok()?;
                Some(ParsedReport {
                    records: raw
                        .results
                        .into_iter()
                        .filter_map(RawResult::into_record)
                        .collect(),
                    summary: ReportSummary {
                        status: raw.status,
                        ..Default::default()
                    },
                })
            }
            SchemaVersion::TextScan => None,
        }
    }
}

#[derive(Serialize)]
struct RichIssueOut<'a> {
    url: &'a str,
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Serializes a report in the [`SchemaVersion::Rich`] shape.
pub(crate) fn to_rich_value(report: &CanonicalReport) -> Value {
    let counts = report.counts();
    let issues: Vec<RichIssueOut<'_>> = report
        .failing_records()
        .map(|r| RichIssueOut {
            url: &r.url,
            file: &r.location.file,
            line: r.location.line,
            status_code: r.status_code,
            description: r.error.as_deref(),
        })
        .collect();

    let success_rate = if report.total_urls() == 0 {
        100.0
    } else {
        counts.ok as f64 * 100.0 / report.total_urls() as f64
    };
    serde_json::json!({
        "status": report.status(),
        "urls": {
            "total_found": report.total_urls(),
            "unique": report.unique_urls(),
            "validated": report.total_urls() - counts.excluded,
            "excluded": counts.excluded,
            "success_rate": success_rate,
        },
        "files": {
            "total": report.files_total(),
            "processed": report.files_processed(),
        },
        "issues": issues,
    })
}
