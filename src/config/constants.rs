//! Configuration constants.
//!
//! This module defines the defaults and limits used throughout the application,
//! including checker flags, run budgets, and rendering caps.

use std::time::Duration;

/// Name of the external checker binary looked up on `PATH`.
pub const DEFAULT_CHECKER: &str = "urlsup";

/// Default file selector when none is given.
pub const DEFAULT_FILES: &str = ".";

/// Default per-request timeout in seconds passed to the checker.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Concurrency assumed when estimating the run budget and none is configured.
///
/// This mirrors the checker's own default; the flag itself is only passed
/// when the user sets it.
pub const ASSUMED_CHECKER_CONCURRENCY: u32 = 10;

/// URL count assumed when estimating the run budget.
pub const DEFAULT_EXPECTED_URLS: u32 = 1000;

// Run budget
/// Lower bound for the derived wall-clock budget of one checker run
pub const MIN_RUN_BUDGET: Duration = Duration::from_secs(60);
/// Upper bound for the derived wall-clock budget of one checker run
pub const MAX_RUN_BUDGET: Duration = Duration::from_secs(3600);

// Sharding
/// Maximum number of shards executed at the same time
pub const DEFAULT_PARALLEL_SHARDS: usize = 4;

// Error reporting
/// Maximum length of payload or stderr excerpts attached to fatal errors
pub const MAX_EXCERPT_LENGTH: usize = 500;

// Rendering
/// Maximum broken-URL rows in the job summary table
pub const MAX_SUMMARY_ROWS: usize = 20;
/// Maximum annotations emitted for a degraded (text-scanned) report
pub const MAX_DEGRADED_ANNOTATIONS: usize = 10;
/// Width of the job summary progress bar in cells
pub const PROGRESS_BAR_LENGTH: usize = 20;

/// Default file name of the JSON artifact, relative to the workspace.
pub const DEFAULT_REPORT_FILE: &str = "urlsup-report.json";

/// Project links shown in the job summary footer.
pub const ACTION_URL: &str = "https://github.com/simeg/urlsup-action";
pub const CHECKER_URL: &str = "https://github.com/simeg/urlsup";
