//! The serializable outcome handed to rendering surfaces.

use serde::Serialize;

use crate::annotate::Annotation;
use crate::report::{SchemaVersion, UrlRecord};

use super::RunReport;

/// JSON-serializable view of a finished run.
///
/// `broken_urls` counts every failing occurrence (broken and timed out);
/// `timed_out_urls` is the timed-out subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeArtifact<'a> {
    pub passed: bool,
    pub total_urls: usize,
    pub broken_urls: usize,
    pub timed_out_urls: usize,
    pub excluded_urls: usize,
    pub unique_urls: usize,
    pub duplicate_urls: usize,
    pub files_total: usize,
    pub files_processed: usize,
    pub success_rate: f64,
    pub broken_rate: f64,
    /// Threshold percentage, `null` in strict mode
    pub threshold_applied: Option<f64>,
    pub threshold_exceeded: bool,
    pub degraded: bool,
    pub schema: SchemaVersion,
    pub checker_exit_code: i32,
    /// Shell-quoted commands that were executed, one per shard
    pub commands: Vec<String>,
    pub records: &'a [UrlRecord],
    pub annotations: &'a [Annotation],
}

impl<'a> From<&'a RunReport> for OutcomeArtifact<'a> {
    fn from(run: &'a RunReport) -> Self {
        let outcome = &run.outcome;
        let report = outcome.report();
        let counts = report.counts();
        Self {
            passed: outcome.passed(),
            total_urls: report.total_urls(),
            broken_urls: counts.broken + counts.timed_out,
            timed_out_urls: counts.timed_out,
            excluded_urls: counts.excluded,
            unique_urls: report.unique_urls(),
            duplicate_urls: report.duplicate_urls(),
            files_total: report.files_total(),
            files_processed: report.files_processed(),
            success_rate: outcome.success_rate(),
            broken_rate: outcome.broken_rate(),
            threshold_applied: outcome.threshold().map(|t| t.percent()),
            threshold_exceeded: outcome.threshold_exceeded(),
            degraded: report.is_degraded(),
            schema: report.provenance().schema,
            checker_exit_code: run.checker_exit_code,
            commands: run.invocations.iter().map(ToString::to_string).collect(),
            records: report.records(),
            annotations: &run.annotations,
        }
    }
}
