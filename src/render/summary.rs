//! Job summary markdown for `$GITHUB_STEP_SUMMARY`.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::annotate::Cause;
use crate::config::{ACTION_URL, CHECKER_URL, MAX_SUMMARY_ROWS, PROGRESS_BAR_LENGTH};
use crate::error_handling::RunError;
use crate::run::RunReport;
use crate::utils::{escape_markdown, normalize_file_path};

/// Renders a text progress bar of [`PROGRESS_BAR_LENGTH`] cells.
pub fn progress_bar(percent: f64) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = (percent * PROGRESS_BAR_LENGTH as f64 / 100.0).floor() as usize;
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(PROGRESS_BAR_LENGTH - filled)
    )
}

fn status_line(run: &RunReport) -> (&'static str, &'static str) {
    let outcome = &run.outcome;
    if !outcome.passed() {
        ("❌", "Some URLs are broken")
    } else if outcome.report().total_urls() == 0 {
        ("⚠️", "No URLs found")
    } else if outcome.failing_urls() > 0 || outcome.report().counts().timed_out > 0 {
        ("✅", "Broken URLs are within tolerance")
    } else {
        ("✅", "All URLs are working")
    }
}

fn action_details(content: &mut String, run_id: Option<&str>) {
    let _ = write!(
        content,
        "\n---\n\n<details>\n<summary>📋 Action Details</summary>\n\n\
         - **Action:** [urlsup-action]({ACTION_URL})\n\
         - **Tool:** [urlsup]({CHECKER_URL})\n\
         - **Report:** Available as workflow artifact\n\
         - **Run ID:** {}\n\n</details>\n",
        run_id.unwrap_or("N/A")
    );
}

/// Renders the job summary for a finished run.
pub fn job_summary(run: &RunReport, run_id: Option<&str>) -> String {
    let artifact = run.artifact();
    let report = run.outcome.report();
    let counts = report.counts();
    let (emoji, status) = status_line(run);

    let mut content = String::new();
    let _ = writeln!(content, "# {emoji} URL Validation Report\n");
    let _ = writeln!(content, "**Status:** {status}\n");
    if artifact.degraded {
        content.push_str(
            "> [!WARNING]\n> The checker output did not match a known report format. \
             Figures below come from a best-effort scan and may be incomplete.\n\n",
        );
    }

    content.push_str("## Summary\n\n| Metric | Value |\n|--------|-------|\n");
    let _ = writeln!(content, "| **Total URLs** | {} |", artifact.total_urls);
    let _ = writeln!(content, "| **Unique URLs** | {} |", artifact.unique_urls);
    let _ = writeln!(content, "| **Working URLs** | {} |", counts.ok);
    let _ = writeln!(content, "| **Broken URLs** | {} |", counts.broken);
    if counts.timed_out > 0 {
        let _ = writeln!(content, "| **Timed out URLs** | {} |", counts.timed_out);
    }
    if counts.excluded > 0 {
        let _ = writeln!(content, "| **Excluded URLs** | {} |", counts.excluded);
    }
    if artifact.files_total > 0 {
        let _ = writeln!(
            content,
            "| **Files** | {} processed of {} |",
            artifact.files_processed, artifact.files_total
        );
    }
    let _ = writeln!(content, "| **Success Rate** | {:.1}% |", artifact.success_rate);
    if let Some(threshold) = run.outcome.threshold() {
        let _ = writeln!(
            content,
            "| **Failure Threshold** | {} ({:.2}% failing{}) |",
            threshold,
            artifact.broken_rate,
            if artifact.threshold_exceeded { ", exceeded" } else { "" }
        );
    }
    content.push('\n');

    if artifact.total_urls > 0 {
        let _ = writeln!(
            content,
            "## Progress\n\n```\n{} {:.1}%\n```\n",
            progress_bar(artifact.success_rate),
            artifact.success_rate
        );
    }

    let failing: Vec<_> = report.failing_records().collect();
    if !failing.is_empty() {
        content.push_str("## Broken URLs Details\n\n");
        content.push_str("| File | Line | URL | Status | Error |\n");
        content.push_str("|------|------|-----|--------|-------|\n");
        for record in failing.iter().take(MAX_SUMMARY_ROWS) {
            let file = normalize_file_path(&record.location.file);
            let _ = writeln!(
                content,
                "| `{}` | {} | {} | {} | {} |",
                escape_markdown(if file.is_empty() { "unknown" } else { &file }),
                record.location.line.unwrap_or(1),
                escape_markdown(&record.url),
                record
                    .status_code
                    .map_or_else(|| "N/A".to_string(), |s| s.to_string()),
                escape_markdown(record.error.as_deref().unwrap_or("N/A")),
            );
        }
        if failing.len() > MAX_SUMMARY_ROWS {
            let _ = writeln!(
                content,
                "\n_{} more not shown; see the report artifact for the full list._",
                failing.len() - MAX_SUMMARY_ROWS
            );
        }
        content.push('\n');
    }

    content.push_str("## Recommendations\n\n");
    let mut causes: Vec<Cause> = Vec::new();
    for annotation in &run.annotations {
        if !causes.contains(&annotation.cause) {
            causes.push(annotation.cause);
        }
    }
    if causes.is_empty() {
        content.push_str(
            "- ✨ **Great job!** All URLs in your repository are working\n\
             - 🔄 **Consider scheduling** regular URL checks to catch broken links early\n",
        );
    } else {
        for cause in causes {
            let _ = writeln!(content, "- **{}:** {}", cause.title(), cause.hint());
        }
    }

    action_details(&mut content, run_id);
    content
}

/// Renders the job summary for a run aborted by a fatal error.
pub fn error_summary(error: &RunError, run_id: Option<&str>) -> String {
    let mut content = String::new();
    let _ = writeln!(content, "# ❌ URL Validation Failed\n");
    let _ = writeln!(content, "**Error:** {}\n", error.kind());
    let _ = writeln!(content, "```\n{}\n```\n", error);
    let _ = writeln!(
        content,
        "Reproduce locally with:\n\n```sh\n{}\n```",
        error.invocation()
    );
    action_details(&mut content, run_id);
    content
}

/// Appends markdown to the job summary file.
pub fn append_summary(path: &Path, markdown: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open job summary file: {}", path.display()))?;
    file.write_all(markdown.as_bytes())
        .with_context(|| format!("Failed to write job summary to {}", path.display()))?;
    Ok(())
}
