//! Process exit codes of the binary.

use crate::classify::Outcome;
use crate::error_handling::{RunError, RunErrorKind};

/// Every URL passed, or failures are tolerated.
pub const EXIT_OK: i32 = 0;
/// The outcome failed under the configured policy.
pub const EXIT_OUTCOME_FAILED: i32 = 1;
/// The configuration is invalid.
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// The checker output could not be parsed (sysexits `EX_DATAERR`).
pub const EXIT_PARSE_ERROR: i32 = 65;
/// The checker exceeded its run budget (same as `timeout(1)`).
pub const EXIT_TIMEOUT: i32 = 124;
/// The checker could not be run (same as a shell's "command not found").
pub const EXIT_INVOCATION_ERROR: i32 = 127;

/// Exit code for a completed run.
///
/// A failed outcome only fails the process when `fail_on_error` is set.
pub fn evaluate_exit_code(outcome: &Outcome, fail_on_error: bool) -> i32 {
    if outcome.passed() || !fail_on_error {
        EXIT_OK
    } else {
        EXIT_OUTCOME_FAILED
    }
}

/// Exit code for a run aborted by a fatal error.
///
/// Fatal errors always fail the process, regardless of `fail_on_error`.
pub fn exit_code_for_error(error: &RunError) -> i32 {
    match error.kind() {
        RunErrorKind::Invocation => EXIT_INVOCATION_ERROR,
        RunErrorKind::Timeout => EXIT_TIMEOUT,
        RunErrorKind::Parse => EXIT_PARSE_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, TolerancePolicy};
    use crate::report::normalize;

    fn outcome(raw: &str) -> Outcome {
        classify(normalize(raw).unwrap(), &TolerancePolicy::strict())
    }

    #[test]
    fn test_passing_outcome() {
        let passing = outcome(r#"{"urls":{"total_found":4},"issues":[]}"#);
        assert_eq!(evaluate_exit_code(&passing, true), EXIT_OK);
        assert_eq!(evaluate_exit_code(&passing, false), EXIT_OK);
    }

    #[test]
    fn test_failing_outcome_respects_fail_on_error() {
        let failing = outcome(r#"{"issues":[{"url":"https://x.io","file":"a.md","status_code":404}]}"#);
        assert_eq!(evaluate_exit_code(&failing, true), EXIT_OUTCOME_FAILED);
        assert_eq!(evaluate_exit_code(&failing, false), EXIT_OK);
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let codes = [
            EXIT_OK,
            EXIT_OUTCOME_FAILED,
            EXIT_CONFIG_ERROR,
            EXIT_PARSE_ERROR,
            EXIT_TIMEOUT,
            EXIT_INVOCATION_ERROR,
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
