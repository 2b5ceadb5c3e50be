//! Report normalization.
//!
//! This module turns raw checker output into a [`CanonicalReport`]:
//! - Structured JSON is tried against each [`SchemaVersion`] in priority order
//! - Non-JSON or unknown JSON falls back to a degraded text scan
//! - Records are deduplicated and counts derived by [`ReportBuilder`]
//! - Shard reports are combined with [`merge_reports`]

mod builder;
mod merge;
mod model;
mod schema;
mod text;

pub use builder::{ReportBuilder, ReportSummary};
pub use merge::{merge, merge_reports};
pub use model::{
    CanonicalReport, OutcomeCounts, Provenance, SchemaVersion, SourceLocation, UrlOutcome,
    UrlRecord,
};
pub use schema::ParsedReport;

use crate::error_handling::{ParseError, ParseFailure};
use crate::utils::excerpt;

/// Parses raw checker output into a canonical report.
///
/// The first structured schema that matches wins. When none does, the output
/// is scanned as text and the report is marked degraded.
///
/// # Errors
///
/// Returns a [`ParseError`] only when the payload is empty or nothing in it is
/// recognizable under any strategy.
pub fn normalize(raw: &str) -> Result<CanonicalReport, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError {
            failure: ParseFailure::Empty,
            excerpt: excerpt(raw),
        });
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw.trim()) {
        for schema in SchemaVersion::STRUCTURED {
            if let Some(parsed) = schema.parse(&value) {
                log::debug!("Checker output matched the {} schema", schema);
                return Ok(build(parsed, Provenance::trusted(schema)));
            }
        }
        log::debug!("Checker output is JSON but matches no known schema");
    }

    match text::scan(raw) {
        Some(parsed) => {
            log::warn!(
                "Checker output matched no known schema; using best-effort text scan ({} URLs recognized)",
                parsed.records.len()
            );
            Ok(build(parsed, Provenance::degraded(SchemaVersion::TextScan)))
        }
        None => Err(ParseError {
            failure: ParseFailure::Unrecognized,
            excerpt: excerpt(raw),
        }),
    }
}

fn build(parsed: ParsedReport, provenance: Provenance) -> CanonicalReport {
    let mut builder = ReportBuilder::new(provenance).summary(parsed.summary);
    builder.extend(parsed.records);
    builder.build()
}

impl CanonicalReport {
    /// Serializes the report in the primary ([`SchemaVersion::Rich`]) schema.
    ///
    /// For a report that [`normalize`] produced from [`SchemaVersion::Rich`]
    /// output, `normalize(&report.to_raw())` yields an equal report. Reports
    /// from other schemas come back tagged `Rich`, and `Results` reports lose
    /// their ok and excluded records, since only failures are listed.
    pub fn to_raw(&self) -> String {
        schema::to_rich_value(self).to_string()
    }
}
