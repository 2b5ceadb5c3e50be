//! Orchestrator lifecycle.

use std::fmt;

/// Phase of a single checker run.
///
/// `Idle -> Invoking -> Parsing -> Classifying -> Done`, with `Failed`
/// reachable from `Invoking` and `Parsing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    Idle,
    Invoking,
    Parsing,
    Classifying,
    Done,
    Failed,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::Invoking => "invoking",
            RunPhase::Parsing => "parsing",
            RunPhase::Classifying => "classifying",
            RunPhase::Done => "done",
            RunPhase::Failed => "failed",
        }
    }

    /// Whether `next` may follow this phase.
    pub fn can_transition_to(self, next: RunPhase) -> bool {
        matches!(
            (self, next),
            (RunPhase::Idle, RunPhase::Invoking)
                | (RunPhase::Invoking, RunPhase::Parsing)
                | (RunPhase::Invoking, RunPhase::Failed)
                | (RunPhase::Parsing, RunPhase::Classifying)
                | (RunPhase::Parsing, RunPhase::Failed)
                | (RunPhase::Classifying, RunPhase::Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Failed)
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks and logs the phase of one run (or one shard of a run).
#[derive(Debug)]
pub(crate) struct PhaseTracker {
    label: String,
    phase: RunPhase,
}

impl PhaseTracker {
    pub(crate) fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            phase: RunPhase::Idle,
        }
    }

    /// A tracker for work that continues from `phase`, such as classifying a
    /// report merged from shards that were each invoked and parsed on their own.
    pub(crate) fn resume(label: impl Into<String>, phase: RunPhase) -> Self {
        Self {
            label: label.into(),
            phase,
        }
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> RunPhase {
        self.phase
    }

    pub(crate) fn advance(&mut self, next: RunPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid run transition {} -> {}",
            self.phase,
            next
        );
        log::debug!("{}: {} -> {}", self.label, self.phase, next);
        self.phase = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            RunPhase::Idle,
            RunPhase::Invoking,
            RunPhase::Parsing,
            RunPhase::Classifying,
            RunPhase::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_failed_only_from_invoking_or_parsing() {
        assert!(RunPhase::Invoking.can_transition_to(RunPhase::Failed));
        assert!(RunPhase::Parsing.can_transition_to(RunPhase::Failed));
        assert!(!RunPhase::Idle.can_transition_to(RunPhase::Failed));
        assert!(!RunPhase::Classifying.can_transition_to(RunPhase::Failed));
        assert!(!RunPhase::Done.can_transition_to(RunPhase::Failed));
    }

    #[test]
    fn test_terminal_phases_are_final() {
        for next in [
            RunPhase::Idle,
            RunPhase::Invoking,
            RunPhase::Parsing,
            RunPhase::Classifying,
            RunPhase::Done,
            RunPhase::Failed,
        ] {
            assert!(!RunPhase::Done.can_transition_to(next));
            assert!(!RunPhase::Failed.can_transition_to(next));
        }
        assert!(RunPhase::Done.is_terminal());
        assert!(!RunPhase::Parsing.is_terminal());
    }

    #[test]
    fn test_tracker_advances() {
        let mut tracker = PhaseTracker::new("test");
        tracker.advance(RunPhase::Invoking);
        tracker.advance(RunPhase::Failed);
        assert_eq!(tracker.phase(), RunPhase::Failed);
    }
}
