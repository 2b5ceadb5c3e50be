//! Run orchestration.
//!
//! A run builds the checker invocation, executes it within its wall-clock
//! budget, normalizes the output, classifies the report and derives
//! annotations. Each stage consumes the previous stage's value; nothing is
//! shared between runs.

mod artifact;
mod exit;
mod phase;

pub use artifact::OutcomeArtifact;
pub use exit::{
    evaluate_exit_code, exit_code_for_error, EXIT_CONFIG_ERROR, EXIT_INVOCATION_ERROR, EXIT_OK,
    EXIT_OUTCOME_FAILED, EXIT_PARSE_ERROR, EXIT_TIMEOUT,
};
pub use phase::RunPhase;

use std::time::Duration;

use futures::{StreamExt, TryStreamExt};
use log::{info, warn};

use crate::annotate::{derive, Annotation};
use crate::classify::{classify, Outcome, TolerancePolicy};
use crate::config::InvocationParameters;
use crate::error_handling::{ExecutionError, InvocationFailure, RunError};
use crate::invocation::{build_invocation, build_invocation_for, Invocation, ProcessExecutor};
use crate::report::{merge_reports, normalize, CanonicalReport};
use crate::utils::excerpt;

use phase::PhaseTracker;

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Pass/fail decision and the canonical report
    pub outcome: Outcome,
    /// One annotation per non-ok record, in record order
    pub annotations: Vec<Annotation>,
    /// Commands executed, one per shard
    pub invocations: Vec<Invocation>,
    /// Checker exit code; for sharded runs the first non-zero one
    pub checker_exit_code: i32,
    /// Sanitized stderr excerpt of the checker
    pub stderr: String,
}

impl RunReport {
    /// The serializable view of this run.
    pub fn artifact(&self) -> OutcomeArtifact<'_> {
        OutcomeArtifact::from(self)
    }
}

/// Normalized output of one checker execution.
struct CheckedShard {
    invocation: Invocation,
    report: CanonicalReport,
    exit_code: i32,
    stderr: String,
}

/// Runs the checker once and parses its output.
async fn check<E: ProcessExecutor>(
    invocation: Invocation,
    budget: Duration,
    executor: &E,
    tracker: &mut PhaseTracker,
) -> Result<CheckedShard, RunError> {
    tracker.advance(RunPhase::Invoking);
    info!("Running {} (budget {}s)", invocation, budget.as_secs());

    let output = match executor.execute(&invocation, budget).await {
        Ok(output) => output,
        Err(error) => {
            tracker.advance(RunPhase::Failed);
            return Err(match error {
                ExecutionError::TimedOut(budget) => RunError::Timeout { invocation, budget },
                ExecutionError::Spawn(e) => RunError::Invocation {
                    invocation,
                    source: InvocationFailure::Spawn(e),
                },
                ExecutionError::Wait(e) => RunError::Invocation {
                    invocation,
                    source: InvocationFailure::Wait(e),
                },
            });
        }
    };

    let stderr = excerpt(&output.stderr);
    if !stderr.is_empty() {
        log::debug!("Checker stderr: {}", stderr);
    }
    if output.exit_code != 0 {
        warn!("Checker exited with code {}", output.exit_code);
        if output.stdout.trim().is_empty() {
            tracker.advance(RunPhase::Failed);
            return Err(RunError::Invocation {
                invocation,
                source: InvocationFailure::NoOutput {
                    exit_code: output.exit_code,
                    stderr,
                },
            });
        }
    }

    tracker.advance(RunPhase::Parsing);
    match normalize(&output.stdout) {
        Ok(report) => Ok(CheckedShard {
            invocation,
            report,
            exit_code: output.exit_code,
            stderr,
        }),
        Err(source) => {
            tracker.advance(RunPhase::Failed);
            Err(RunError::Parse {
                invocation,
                exit_code: output.exit_code,
                source,
            })
        }
    }
}

/// Classifies a report and derives its annotations.
fn conclude(
    report: CanonicalReport,
    params: &InvocationParameters,
    tracker: &mut PhaseTracker,
) -> (Outcome, Vec<Annotation>) {
    tracker.advance(RunPhase::Classifying);
    let outcome = classify(report, &TolerancePolicy::from(params));
    let annotations = derive(outcome.report().records());
    tracker.advance(RunPhase::Done);
    (outcome, annotations)
}

/// Runs the checker over all of `params.files`.
///
/// A non-zero checker exit code is not an error as long as the checker printed
/// a report: it usually just means broken URLs were found.
///
/// # Errors
///
/// Returns a [`RunError`] when the checker cannot be started, exits non-zero
/// without output, exceeds [`InvocationParameters::run_budget`], or prints
/// nothing recognizable.
pub async fn run<E: ProcessExecutor>(
    params: &InvocationParameters,
    executor: &E,
) -> Result<RunReport, RunError> {
    let mut tracker = PhaseTracker::new("run");
    let shard = check(
        build_invocation(params),
        params.run_budget(),
        executor,
        &mut tracker,
    )
    .await?;

    let (outcome, annotations) = conclude(shard.report, params, &mut tracker);
    Ok(RunReport {
        outcome,
        annotations,
        invocations: vec![shard.invocation],
        checker_exit_code: shard.exit_code,
        stderr: shard.stderr,
    })
}

/// Runs the checker over `params.files` split into shards of `shard_size`.
///
/// At most `parallel_shards` shards execute at the same time. Shard reports are
/// merged before classification, so the threshold applies to the whole
/// population. With `shard_size` 0, or no more selectors than `shard_size`,
/// this is a plain [`run`].
///
/// # Errors
///
/// The first failing shard (in selector order) fails the whole run; shards
/// still in flight are cancelled.
pub async fn run_sharded<E: ProcessExecutor>(
    params: &InvocationParameters,
    shard_size: usize,
    parallel_shards: usize,
    executor: &E,
) -> Result<RunReport, RunError> {
    if shard_size == 0 || params.files.len() <= shard_size {
        return run(params, executor).await;
    }

    let shards: Vec<&[String]> = params.files.chunks(shard_size).collect();
    let shard_count = shards.len();
    info!(
        "Splitting {} file selectors into {} shards ({} at a time)",
        params.files.len(),
        shard_count,
        parallel_shards.max(1)
    );
    let budget = params.run_budget();

    let checked: Vec<CheckedShard> = futures::stream::iter(shards.into_iter().enumerate())
        .map(|(index, files)| {
            let invocation = build_invocation_for(params, files);
            async move {
                // Shards stop after parsing; classification happens once after merging.
                let mut tracker =
                    PhaseTracker::new(format!("shard {}/{}", index + 1, shard_count));
                check(invocation, budget, executor, &mut tracker).await
            }
        })
        .buffered(parallel_shards.max(1))
        .try_collect()
        .await?;

    let mut invocations = Vec::with_capacity(checked.len());
    let mut reports = Vec::with_capacity(checked.len());
    let mut checker_exit_code = 0;
    let mut stderr = Vec::new();
    for shard in checked {
        if checker_exit_code == 0 {
            checker_exit_code = shard.exit_code;
        }
        if !shard.stderr.is_empty() {
            stderr.push(shard.stderr);
        }
        invocations.push(shard.invocation);
        reports.push(shard.report);
    }

    let merged = merge_reports(reports);
    let mut tracker = PhaseTracker::resume("merged run", RunPhase::Parsing);
    let (outcome, annotations) = conclude(merged, params, &mut tracker);

    Ok(RunReport {
        outcome,
        annotations,
        invocations,
        checker_exit_code,
        stderr: excerpt(&stderr.join("\n")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::RunErrorKind;
    use crate::invocation::ProcessOutput;
    use std::sync::Mutex;

    /// Replies with a canned result and records the invocations it saw.
    struct FakeExecutor {
        reply: fn(&Invocation) -> Result<ProcessOutput, ExecutionError>,
        seen: Mutex<Vec<Invocation>>,
    }

    impl FakeExecutor {
        fn new(reply: fn(&Invocation) -> Result<ProcessOutput, ExecutionError>) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl ProcessExecutor for FakeExecutor {
        async fn execute(
            &self,
            invocation: &Invocation,
            _budget: Duration,
        ) -> Result<ProcessOutput, ExecutionError> {
            self.seen.lock().unwrap().push(invocation.clone());
            (self.reply)(invocation)
        }
    }

    fn output(stdout: &str, exit_code: i32) -> Result<ProcessOutput, ExecutionError> {
        Ok(ProcessOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code,
        })
    }

    #[tokio::test]
    async fn test_non_zero_exit_with_report_is_outcome() {
        let executor = FakeExecutor::new(|_| {
            output(
                r#"{"status":"failure","urls":{"total_found":2},"issues":[{"url":"https://x.io","file":"a.md","line":1,"status_code":404}]}"#,
                1,
            )
        });
        let report = run(&InvocationParameters::default(), &executor).await.unwrap();
        assert!(!report.outcome.passed());
        assert_eq!(report.checker_exit_code, 1);
        assert_eq!(report.annotations.len(), 1);
        assert_eq!(report.invocations.len(), 1);
        assert_eq!(executor.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_zero_exit_without_output_is_invocation_error() {
        let executor = FakeExecutor::new(|_| {
            Ok(ProcessOutput {
                stdout: "  \n".to_string(),
                stderr: "error: unexpected argument".to_string(),
                exit_code: 2,
            })
        });
        let err = run(&InvocationParameters::default(), &executor).await.unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::Invocation);
        assert!(err.to_string().contains("unexpected argument"));
        assert!(err.to_string().contains("urlsup . --recursive"));
    }

    #[tokio::test]
    async fn test_zero_exit_with_empty_output_is_parse_error() {
        let executor = FakeExecutor::new(|_| output("", 0));
        let err = run(&InvocationParameters::default(), &executor).await.unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::Parse);
    }

    #[tokio::test]
    async fn test_timeout_is_distinct() {
        let executor =
            FakeExecutor::new(|_| Err(ExecutionError::TimedOut(Duration::from_secs(60))));
        let err = run(&InvocationParameters::default(), &executor).await.unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_sharded_run_merges_before_classifying() {
        // The second shard alone is 10% broken; the merged population is 5%.
        let executor = FakeExecutor::new(|invocation| match invocation.args()[0].as_str() {
            "a.md" => output(r#"{"urls":{"total_found":10},"issues":[]}"#, 0),
            _ => output(
                r#"{"urls":{"total_found":10},"issues":[{"url":"https://x.io","file":"c.md","line":1,"status_code":500}]}"#,
                1,
            ),
        });
        let params = InvocationParameters {
            files: vec!["a.md".into(), "b.md".into(), "c.md".into(), "d.md".into()],
            failure_threshold: Some(crate::config::FailureThreshold::new(5.0).unwrap()),
            ..Default::default()
        };
        let report = run_sharded(&params, 2, 2, &executor).await.unwrap();
        assert_eq!(report.invocations.len(), 2);
        assert_eq!(report.invocations[0].args()[..2], ["a.md", "b.md"]);
        assert_eq!(report.invocations[1].args()[..2], ["c.md", "d.md"]);
        assert_eq!(report.checker_exit_code, 1);

        let merged = report.outcome.report();
        assert_eq!(merged.total_urls(), 20);
        assert_eq!(merged.counts().broken, 1);
        assert_eq!(report.outcome.broken_rate(), 5.0);
        assert!(report.outcome.passed());
        assert_eq!(report.annotations.len(), 1);
    }

    #[tokio::test]
    async fn test_sharding_disabled_runs_once() {
        let executor = FakeExecutor::new(|_| output(r#"{"issues":[]}"#, 0));
        let params = InvocationParameters {
            files: vec!["a.md".into(), "b.md".into()],
            ..Default::default()
        };
        run_sharded(&params, 0, 4, &executor).await.unwrap();
        run_sharded(&params, 5, 4, &executor).await.unwrap();
        assert_eq!(executor.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_any_failing_shard_fails_run() {
        let executor = FakeExecutor::new(|_| output("", 3));
        let params = InvocationParameters {
            files: vec!["a.md".into(), "b.md".into(), "c.md".into()],
            ..Default::default()
        };
        let err = run_sharded(&params, 1, 2, &executor).await.unwrap_err();
        assert_eq!(err.kind(), RunErrorKind::Invocation);
    }
}
