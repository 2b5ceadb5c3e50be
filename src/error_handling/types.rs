//! Error type definitions.
//!
//! This module defines the fatal error taxonomy of a run. Broken URLs are never
//! errors: they are reported through [`Outcome`](crate::Outcome).

use std::time::Duration;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::invocation::Invocation;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Failure reported by a [`ProcessExecutor`](crate::invocation::ProcessExecutor).
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The process could not be started (binary missing, permission denied).
    #[error("failed to start process: {0}")]
    Spawn(#[source] std::io::Error),

    /// Waiting for the process or reading its output failed.
    #[error("failed to collect process output: {0}")]
    Wait(#[source] std::io::Error),

    /// The process exceeded its wall-clock budget and was killed.
    #[error("process did not finish within {}s", .0.as_secs_f64())]
    TimedOut(Duration),
}

/// Why the checker could not be run to completion.
#[derive(Error, Debug)]
pub enum InvocationFailure {
    /// The process could not be started.
    #[error("could not start checker: {0}")]
    Spawn(#[source] std::io::Error),

    /// Waiting for the process failed.
    #[error("lost track of checker process: {0}")]
    Wait(#[source] std::io::Error),

    /// The process exited non-zero without printing anything on stdout.
    #[error("checker exited with code {exit_code} and produced no output; stderr: {stderr}")]
    NoOutput {
        /// Exit code (-1 when killed by a signal)
        exit_code: i32,
        /// Truncated stderr excerpt
        stderr: String,
    },
}

/// What made a raw payload unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIterMacro)]
pub enum ParseFailure {
    /// The payload is empty or whitespace only.
    Empty,
    /// No schema matched and the text scan found nothing recognizable.
    Unrecognized,
}

impl ParseFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseFailure::Empty => "checker output is empty",
            ParseFailure::Unrecognized => "checker output contains no recognizable report",
        }
    }
}

/// The raw checker output could not be turned into a report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}; output excerpt: {excerpt:?}", .failure.as_str())]
pub struct ParseError {
    /// What went wrong
    pub failure: ParseFailure,
    /// Truncated, sanitized excerpt of the offending payload
    pub excerpt: String,
}

/// Distinguishes fatal run errors so callers can map them to exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum RunErrorKind {
    /// The checker could not be started or exited without output
    Invocation,
    /// The run exceeded its wall-clock budget
    Timeout,
    /// The checker output could not be parsed
    Parse,
}

impl RunErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunErrorKind::Invocation => "invocation error",
            RunErrorKind::Timeout => "timeout error",
            RunErrorKind::Parse => "parse error",
        }
    }
}

impl std::fmt::Display for RunErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal error that aborted a run.
///
/// Every variant carries the exact invocation so the failure can be reproduced
/// without re-running the orchestrator.
#[derive(Error, Debug)]
pub enum RunError {
    /// The checker could not be started or exited without output.
    #[error("{source} (command: {invocation})")]
    Invocation {
        /// Command that was executed
        invocation: Invocation,
        /// Underlying failure
        #[source]
        source: InvocationFailure,
    },

    /// The checker did not finish within the run budget and was cancelled.
    #[error("checker did not finish within {}s and was cancelled (command: {invocation})", .budget.as_secs_f64())]
    Timeout {
        /// Command that was executed
        invocation: Invocation,
        /// Budget that was exceeded
        budget: Duration,
    },

    /// The checker output could not be parsed.
    #[error("{source}; checker exit code {exit_code} (command: {invocation})")]
    Parse {
        /// Command that was executed
        invocation: Invocation,
        /// Exit code of the checker
        exit_code: i32,
        /// Underlying parse error with payload excerpt
        #[source]
        source: ParseError,
    },
}

impl RunError {
    /// The kind of this error.
    pub fn kind(&self) -> RunErrorKind {
        match self {
            RunError::Invocation { .. } => RunErrorKind::Invocation,
            RunError::Timeout { .. } => RunErrorKind::Timeout,
            RunError::Parse { .. } => RunErrorKind::Parse,
        }
    }

    /// The command that was executed.
    pub fn invocation(&self) -> &Invocation {
        match self {
            RunError::Invocation { invocation, .. }
            | RunError::Timeout { invocation, .. }
            | RunError::Parse { invocation, .. } => invocation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn invocation() -> Invocation {
        Invocation::new("urlsup", vec!["docs".to_string(), "--format".to_string(), "json".to_string()])
    }

    #[test]
    fn test_run_error_kind_matches_variant() {
        let err = RunError::Timeout {
            invocation: invocation(),
            budget: Duration::from_secs(60),
        };
        assert_eq!(err.kind(), RunErrorKind::Timeout);

        let err = RunError::Parse {
            invocation: invocation(),
            exit_code: 1,
            source: ParseError {
                failure: ParseFailure::Empty,
                excerpt: String::new(),
            },
        };
        assert_eq!(err.kind(), RunErrorKind::Parse);
    }

    #[test]
    fn test_run_error_message_includes_command() {
        let err = RunError::Invocation {
            invocation: invocation(),
            source: InvocationFailure::Spawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No such file or directory",
            )),
        };
        let message = err.to_string();
        assert!(message.contains("could not start checker"));
        assert!(message.contains("urlsup docs --format json"));
    }

    #[test]
    fn test_parse_error_message_includes_excerpt() {
        let err = RunError::Parse {
            invocation: invocation(),
            exit_code: 2,
            source: ParseError {
                failure: ParseFailure::Unrecognized,
                excerpt: "segfault".to_string(),
            },
        };
        let message = err.to_string();
        assert!(message.contains("no recognizable report"));
        assert!(message.contains("\"segfault\""));
        assert!(message.contains("exit code 2"));
    }

    #[test]
    fn test_all_kinds_have_string_representation() {
        for kind in RunErrorKind::iter() {
            assert!(!kind.as_str().is_empty(), "{:?} should have a name", kind);
        }
        for failure in ParseFailure::iter() {
            assert!(!failure.as_str().is_empty(), "{:?} should have a name", failure);
        }
    }
}
