//! Outcome classification.
//!
//! Decides pass/fail for a [`CanonicalReport`] under a [`TolerancePolicy`] and
//! computes the summary statistics shown to users. Broken URLs and exceeded
//! thresholds are ordinary data here, never errors.

use serde::Serialize;

use crate::config::{FailureThreshold, InvocationParameters};
use crate::report::CanonicalReport;

/// How much failure a run tolerates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TolerancePolicy {
    /// Maximum failing percentage; `None` means strict mode
    pub threshold: Option<FailureThreshold>,
    /// Timed-out URLs do not count as failing
    pub allow_timeout: bool,
}

impl TolerancePolicy {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn with_threshold(threshold: FailureThreshold) -> Self {
        Self {
            threshold: Some(threshold),
            allow_timeout: false,
        }
    }
}

impl From<&InvocationParameters> for TolerancePolicy {
    fn from(params: &InvocationParameters) -> Self {
        Self {
            threshold: params.failure_threshold,
            allow_timeout: params.allow_timeout,
        }
    }
}

/// Terminal decision of a run.
///
/// Constructed once by [`classify`] and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    passed: bool,
    success_rate: f64,
    broken_rate: f64,
    failing_urls: usize,
    threshold: Option<FailureThreshold>,
    threshold_exceeded: bool,
    report: CanonicalReport,
}

impl Outcome {
    /// Whether the run passes under its policy.
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Percentage of URL occurrences that are ok, rounded to one decimal.
    ///
    /// `100.0` when no URLs were found.
    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    /// Unrounded percentage of URL occurrences counted as failing.
    pub fn broken_rate(&self) -> f64 {
        self.broken_rate
    }

    /// Occurrences counted as failing under the policy.
    pub fn failing_urls(&self) -> usize {
        self.failing_urls
    }

    /// Threshold applied, if any.
    pub fn threshold(&self) -> Option<FailureThreshold> {
        self.threshold
    }

    pub fn threshold_exceeded(&self) -> bool {
        self.threshold_exceeded
    }

    pub fn report(&self) -> &CanonicalReport {
        &self.report
    }
}

/// Failing percentage of a report under `allow_timeout`.
pub fn broken_rate(report: &CanonicalReport, allow_timeout: bool) -> f64 {
    failing_count(report, allow_timeout) as f64 * 100.0 / report.total_urls().max(1) as f64
}

fn failing_count(report: &CanonicalReport, allow_timeout: bool) -> usize {
    let counts = report.counts();
    if allow_timeout {
        counts.broken
    } else {
        counts.broken + counts.timed_out
    }
}

/// Rounds to one decimal place.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Classifies a report under `policy`.
///
/// Strict mode passes only when nothing is failing. Threshold mode passes when
/// the failing percentage is at most the threshold; a rate exactly equal to
/// the threshold passes. A report with no URLs always passes.
pub fn classify(report: CanonicalReport, policy: &TolerancePolicy) -> Outcome {
    let total = report.total_urls();
    let failing_urls = failing_count(&report, policy.allow_timeout);
    let broken_rate = broken_rate(&report, policy.allow_timeout);

    let success_rate = if total == 0 {
        100.0
    } else {
        round_one_decimal(report.counts().ok as f64 * 100.0 / total as f64)
    };

    let (passed, threshold_exceeded) = match policy.threshold {
        Some(threshold) => {
            let exceeded = broken_rate > threshold.percent();
            (!exceeded, exceeded)
        }
        None => (failing_urls == 0, false),
    };

    log::debug!(
        "Classified report: {} failing of {} ({:.2}%), threshold {}, passed: {}",
        failing_urls,
        total,
        broken_rate,
        policy
            .threshold
            .map_or_else(|| "none".to_string(), |t| t.to_string()),
        passed
    );

    Outcome {
        passed,
        success_rate,
        broken_rate,
        failing_urls,
        threshold: policy.threshold,
        threshold_exceeded,
        report,
    }
}
