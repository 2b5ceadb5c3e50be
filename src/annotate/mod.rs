//! Annotation derivation.
//!
//! Maps every non-ok [`UrlRecord`] to one [`Annotation`] carrying a severity,
//! a message and a remediation hint. Annotations are independent of any
//! display surface; the renderers decide how to show them.

mod cause;

pub use cause::{classify_cause, is_local_host, Cause};

use serde::Serialize;

use crate::report::{SourceLocation, UrlOutcome, UrlRecord};

/// How prominently an annotation should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Notice,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Notice => "notice",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic for one non-ok URL record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Where the URL was found
    pub location: SourceLocation,
    pub url: String,
    pub severity: Severity,
    pub cause: Cause,
    /// One-line description including the status code or error
    pub message: String,
    /// Suggested remediation
    pub hint: &'static str,
}

fn severity_for(outcome: UrlOutcome) -> Severity {
    match outcome {
        UrlOutcome::TimedOut => Severity::Warning,
        UrlOutcome::Excluded => Severity::Notice,
        UrlOutcome::Ok | UrlOutcome::Broken => Severity::Error,
    }
}

fn message_for(record: &UrlRecord) -> String {
    let mut message = match record.outcome {
        UrlOutcome::TimedOut => format!("Timed out URL: {}", record.url),
        UrlOutcome::Excluded => format!("Excluded URL: {}", record.url),
        UrlOutcome::Ok | UrlOutcome::Broken => format!("Broken URL: {}", record.url),
    };
    if let Some(status) = record.status_code {
        message.push_str(&format!(" (HTTP {})", status));
    }
    if let Some(error) = record.error.as_deref().filter(|e| !e.trim().is_empty()) {
        message.push_str(" - ");
        message.push_str(error.trim());
    }
    message
}

/// Annotates a single record, or returns `None` for ok records.
pub fn annotate(record: &UrlRecord) -> Option<Annotation> {
    if record.outcome == UrlOutcome::Ok {
        return None;
    }
    let cause = classify_cause(record);
    Some(Annotation {
        location: record.location.clone(),
        url: record.url.clone(),
        severity: severity_for(record.outcome),
        cause,
        message: message_for(record),
        hint: cause.hint(),
    })
}

/// Derives one annotation per non-ok record, preserving input order.
pub fn derive<'a>(records: impl IntoIterator<Item = &'a UrlRecord>) -> Vec<Annotation> {
    records.into_iter().filter_map(annotate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(url: &str, outcome: UrlOutcome, status: Option<u16>, error: Option<&str>) -> UrlRecord {
        UrlRecord {
            url: url.to_string(),
            location: SourceLocation::new("docs/a.md", Some(4)),
            outcome,
            status_code: status,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_rate_limited_github() {
        let annotations = derive(&[record(
            "https://github.com/owner/repo",
            UrlOutcome::Broken,
            Some(429),
            None,
        )]);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].cause, Cause::RateLimited);
        assert_ne!(annotations[0].cause, Cause::Generic);
        assert_eq!(annotations[0].severity, Severity::Error);
    }

    #[test]
    fn test_message_template() {
        let a = annotate(&record("https://x.io", UrlOutcome::Broken, Some(404), Some("Not Found")))
            .unwrap();
        assert_eq!(a.message, "Broken URL: https://x.io (HTTP 404) - Not Found");

        let a = annotate(&record("https://x.io", UrlOutcome::Broken, None, None)).unwrap();
        assert_eq!(a.message, "Broken URL: https://x.io");

        let a = annotate(&record("https://slow.io", UrlOutcome::TimedOut, None, Some("timed out")))
            .unwrap();
        assert_eq!(a.message, "Timed out URL: https://slow.io - timed out");
        assert_eq!(a.severity, Severity::Warning);
        assert_eq!(a.cause, Cause::Timeout);
    }

    #[test]
    fn test_excluded_records_are_notices() {
        let a = annotate(&record("https://skip.io", UrlOutcome::Excluded, None, None)).unwrap();
        assert_eq!(a.severity, Severity::Notice);
        assert_eq!(a.message, "Excluded URL: https://skip.io");
    }

    #[test]
    fn test_order_preserved_and_ok_skipped() {
        let records = vec![
            record("https://a.io", UrlOutcome::Broken, Some(500), None),
            record("https://b.io", UrlOutcome::Ok, Some(200), None),
            record("https://c.io", UrlOutcome::TimedOut, None, None),
        ];
        let annotations = derive(&records);
        let urls: Vec<_> = annotations.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.io", "https://c.io"]);
        assert_eq!(annotations[0].location, records[0].location);
    }

    fn arb_outcome() -> impl Strategy<Value = UrlOutcome> {
        prop::sample::select(vec![
            UrlOutcome::Ok,
            UrlOutcome::Broken,
            UrlOutcome::TimedOut,
            UrlOutcome::Excluded,
        ])
    }

    proptest! {
        #[test]
        fn prop_one_annotation_per_non_ok_record(
            entries in prop::collection::vec(
                (arb_outcome(), prop::option::of(100u16..600), "[a-z]{1,8}"),
                0..30,
            )
        ) {
            let records: Vec<UrlRecord> = entries
                .iter()
                .map(|(outcome, status, host)| {
                    record(&format!("https://{host}.io"), *outcome, *status, None)
                })
                .collect();
            let annotations = derive(&records);
            let non_ok = records.iter().filter(|r| r.outcome != UrlOutcome::Ok).count();
            prop_assert_eq!(annotations.len(), non_ok);
        }
    }
}
