//! Console summary logged at the end of a run.

use log::{info, warn};

use crate::run::RunReport;

/// One-line summary of a run.
pub fn summary_line(run: &RunReport) -> String {
    let artifact = run.artifact();
    let mut line = format!(
        "Checked {} URL{} ({} unique): {} broken",
        artifact.total_urls,
        if artifact.total_urls == 1 { "" } else { "s" },
        artifact.unique_urls,
        artifact.broken_urls - artifact.timed_out_urls,
    );
    if artifact.timed_out_urls > 0 {
        line.push_str(&format!(", {} timed out", artifact.timed_out_urls));
    }
    if artifact.excluded_urls > 0 {
        line.push_str(&format!(", {} excluded", artifact.excluded_urls));
    }
    line.push_str(&format!(", success rate {:.1}%", artifact.success_rate));
    if let Some(threshold) = run.outcome.threshold() {
        line.push_str(&format!(
            ", failing {:.2}% (threshold {})",
            artifact.broken_rate, threshold
        ));
    }
    line
}

/// Logs the summary and each annotation.
pub fn log_summary(run: &RunReport) {
    for annotation in &run.annotations {
        info!(
            "{} [{}] {}",
            annotation.location, annotation.cause, annotation.message
        );
    }
    if run.outcome.report().is_degraded() {
        warn!("Figures come from a best-effort scan of unrecognized checker output");
    }
    let verdict = if run.outcome.passed() { "PASSED" } else { "FAILED" };
    info!("{}: {}", verdict, summary_line(run));
}
