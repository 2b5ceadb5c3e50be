//! Publishing a run to every configured surface.
//!
//! Surfaces are independent: a failure to write one is logged as a warning
//! and the remaining surfaces are still written, so step outputs such as
//! `exit-code` reach later workflow steps even when the report file cannot be
//! created.

use std::io::Write;

use anyhow::{Context, Result};
use log::{error, warn};

use crate::annotate::Severity;
use crate::config::Config;
use crate::error_handling::RunError;
use crate::run::RunReport;

use super::{
    append_outputs, append_summary, error_summary, job_summary, log_summary, step_outputs,
    workflow_command, write_annotations, write_artifact,
};

/// Logs a failed surface and keeps it for the caller.
fn record(failures: &mut Vec<anyhow::Error>, result: Result<()>) {
    if let Err(e) = result {
        warn!("{:#}", e);
        failures.push(e);
    }
}

fn write_workflow_annotations(report: &RunReport) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_annotations(
        &mut out,
        &report.annotations,
        report.outcome.report().is_degraded(),
    )
    .context("Failed to write annotations")?;
    out.flush().context("Failed to write annotations")?;
    Ok(())
}

/// Publishes a finished run: console, annotations, JSON artifact, step outputs
/// and job summary.
///
/// Returns the surfaces that could not be written; each has already been
/// logged.
pub fn publish_report(config: &Config, report: &RunReport, exit_code: i32) -> Vec<anyhow::Error> {
    let mut failures = Vec::new();
    log_summary(report);

    if config.github.annotations {
        record(&mut failures, write_workflow_annotations(report));
    }
    record(
        &mut failures,
        write_artifact(&config.report_path, &report.artifact()),
    );
    if let Some(path) = &config.github.output_file {
        record(
            &mut failures,
            append_outputs(path, &step_outputs(report, exit_code, &config.report_path)),
        );
    }
    if let Some(path) = &config.github.step_summary_file {
        record(
            &mut failures,
            append_summary(path, &job_summary(report, config.github.run_id.as_deref())),
        );
    }
    failures
}

/// Publishes a fatal run error: error log, error annotation, `exit-code`
/// output and error summary.
pub fn publish_error(config: &Config, err: &RunError, exit_code: i32) -> Vec<anyhow::Error> {
    let mut failures = Vec::new();
    error!("{} ({})", err, err.kind());

    if config.github.annotations {
        println!(
            "{}",
            workflow_command(
                Severity::Error,
                &[("title", format!("urlsup {}", err.kind()))],
                &err.to_string(),
            )
        );
    }
    if let Some(path) = &config.github.output_file {
        record(
            &mut failures,
            append_outputs(path, &[("exit-code", exit_code.to_string())]),
        );
    }
    if let Some(path) = &config.github.step_summary_file {
        record(
            &mut failures,
            append_summary(path, &error_summary(err, config.github.run_id.as_deref())),
        );
    }
    failures
}
