//! Configuration types.
//!
//! This module defines the typed, validated parameters for one checker run and
//! the enums shared with the command-line layer.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::constants::{
    ASSUMED_CHECKER_CONCURRENCY, DEFAULT_CHECKER, DEFAULT_EXPECTED_URLS, DEFAULT_FILES,
    DEFAULT_PARALLEL_SHARDS, DEFAULT_REPORT_FILE, DEFAULT_TIMEOUT_SECS, MAX_RUN_BUDGET,
    MIN_RUN_BUDGET,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Maximum tolerated percentage of failing URLs, inclusive.
///
/// Always a finite value in `[0, 100]`. An absent threshold means strict mode:
/// any failing URL fails the run.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct FailureThreshold(f64);

impl FailureThreshold {
    /// Creates a threshold, rejecting values outside `[0, 100]`.
    pub fn new(percent: f64) -> Result<Self, ConfigValidationError> {
        if percent.is_finite() && (0.0..=100.0).contains(&percent) {
            Ok(Self(percent))
        } else {
            Err(ConfigValidationError::new(
                "failure_threshold",
                format!("must be a percentage between 0 and 100, got {percent}"),
            ))
        }
    }

    /// The threshold as a percentage.
    pub fn percent(self) -> f64 {
        self.0
    }
}

impl FromStr for FailureThreshold {
    type Err = ConfigValidationError;

    /// Accepts `5`, `5%`, `2.5` and `2.5 %`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%').trim_end();
        let value: f64 = trimmed.parse().map_err(|_| {
            ConfigValidationError::new(
                "failure_threshold",
                format!("must be a number between 0 and 100 (optionally suffixed with %), got '{s}'"),
            )
        })?;
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for FailureThreshold {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Self::new(n),
            Repr::Text(s) => s.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for FailureThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A configuration value that failed validation.
///
/// Carries the offending field name and an actionable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {message}")]
pub struct ConfigValidationError {
    /// Name of the invalid field
    pub field: &'static str,
    /// Human-readable explanation including the accepted range
    pub message: String,
}

impl ConfigValidationError {
    pub(crate) fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Immutable parameters for one checker run.
///
/// Resolved once per run and never mutated afterwards. The argument list passed
/// to the checker is derived from these fields by
/// [`build_invocation`](crate::invocation::build_invocation).
///
/// # Examples
///
/// ```
/// use urlsup_action::{FailureThreshold, InvocationParameters};
///
/// let params = InvocationParameters {
///     files: vec!["docs".to_string()],
///     failure_threshold: Some(FailureThreshold::new(5.0).unwrap()),
///     ..Default::default()
/// };
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationParameters {
    /// Checker program name or path
    pub checker: String,
    /// Files or directories to scan
    pub files: Vec<String>,
    /// Descend into directories
    pub recursive: bool,
    /// File extensions to include (without dots)
    pub include_extensions: Vec<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Concurrent requests; the checker default applies when absent
    pub concurrency: Option<u32>,
    /// Retry attempts for failed requests
    pub retry: u32,
    /// Delay between retries in milliseconds
    pub retry_delay_ms: Option<u64>,
    /// Delay between requests in milliseconds (0 disables)
    pub rate_limit_ms: u64,
    /// URL patterns that are never reported as broken
    pub allowlist: Vec<String>,
    /// Additional HTTP status codes treated as success
    pub allow_status: Vec<u16>,
    /// Regex of URLs to skip
    pub exclude_pattern: Option<String>,
    /// Tolerate timed-out URLs
    pub allow_timeout: bool,
    /// Failure threshold; `None` means strict mode
    pub failure_threshold: Option<FailureThreshold>,
    /// User-Agent header sent by the checker
    pub user_agent: Option<String>,
    /// HTTP(S) proxy URL
    pub proxy: Option<String>,
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Ask the checker for minimal output
    pub quiet: bool,
    /// Ask the checker for verbose output
    pub verbose: bool,
    /// Checker configuration file
    pub checker_config: Option<PathBuf>,
    /// Ignore any checker configuration file
    pub no_checker_config: bool,
    /// Explicit wall-clock budget for the whole checker run
    pub run_timeout: Option<Duration>,
    /// URL count assumed when deriving the run budget
    pub expected_urls: u32,
}

impl Default for InvocationParameters {
    fn default() -> Self {
        Self {
            checker: DEFAULT_CHECKER.to_string(),
            files: vec![DEFAULT_FILES.to_string()],
            recursive: true,
            include_extensions: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            concurrency: None,
            retry: 0,
            retry_delay_ms: None,
            rate_limit_ms: 0,
            allowlist: Vec::new(),
            allow_status: Vec::new(),
            exclude_pattern: None,
            allow_timeout: false,
            failure_threshold: None,
            user_agent: None,
            proxy: None,
            insecure: false,
            quiet: false,
            verbose: false,
            checker_config: None,
            no_checker_config: false,
            run_timeout: None,
            expected_urls: DEFAULT_EXPECTED_URLS,
        }
    }
}

impl InvocationParameters {
    /// Checks every field against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigValidationError`] found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.checker.trim().is_empty() {
            return Err(ConfigValidationError::new(
                "checker",
                "must name the checker binary (e.g. 'urlsup')",
            ));
        }
        if let Some(threshold) = self.failure_threshold {
            FailureThreshold::new(threshold.percent())?;
        }
        if self.timeout_secs == 0 {
            return Err(ConfigValidationError::new(
                "timeout",
                "must be greater than 0 seconds",
            ));
        }
        if self.concurrency == Some(0) {
            return Err(ConfigValidationError::new(
                "concurrency",
                "must be greater than 0 when set",
            ));
        }
        if self.files.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigValidationError::new(
                "files",
                "file selectors must not be empty strings",
            ));
        }
        if self
            .include_extensions
            .iter()
            .any(|e| e.trim().trim_start_matches('.').is_empty())
        {
            return Err(ConfigValidationError::new(
                "include_extensions",
                "extensions must be non-empty, e.g. 'md,html'",
            ));
        }
        if let Some(pattern) = &self.exclude_pattern {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(ConfigValidationError::new(
                    "exclude_pattern",
                    format!("is not a valid regular expression: {e}"),
                ));
            }
        }
        if self.run_timeout == Some(Duration::ZERO) {
            return Err(ConfigValidationError::new(
                "run_timeout",
                "must be greater than 0 seconds when set",
            ));
        }
        Ok(())
    }

    /// Wall-clock budget for one checker run.
    ///
    /// An explicit `run_timeout` wins. Otherwise the budget is
    /// `timeout × (retry + 1) × ceil(expected_urls / concurrency)` plus
    /// `retry_delay × retry`, clamped to [`MIN_RUN_BUDGET`, `MAX_RUN_BUDGET`].
    pub fn run_budget(&self) -> Duration {
        if let Some(explicit) = self.run_timeout {
            return explicit;
        }

        let concurrency = u64::from(self.concurrency.unwrap_or(ASSUMED_CHECKER_CONCURRENCY).max(1));
        let waves = u64::from(self.expected_urls).div_ceil(concurrency).max(1);
        let attempts = u64::from(self.retry).saturating_add(1);
        let request_secs = self
            .timeout_secs
            .saturating_mul(attempts)
            .saturating_mul(waves);
        let delay_ms = self
            .retry_delay_ms
            .unwrap_or(0)
            .saturating_mul(u64::from(self.retry));

        Duration::from_secs(request_secs)
            .checked_add(Duration::from_millis(delay_ms))
            .unwrap_or(MAX_RUN_BUDGET)
            .clamp(MIN_RUN_BUDGET, MAX_RUN_BUDGET)
    }
}

/// Complete application configuration.
///
/// Wraps the checker parameters with the settings that only matter to the
/// binary: logging, failure policy, sharding, and rendering destinations.
#[derive(Debug, Clone)]
pub struct Config {
    /// Parameters of the checker run
    pub params: InvocationParameters,
    /// Log level
    pub log_level: LogLevel,
    /// Log format
    pub log_format: LogFormat,
    /// Exit non-zero when the outcome fails
    pub fail_on_error: bool,
    /// Split file selectors into shards of this size (0 disables sharding)
    pub shard_size: usize,
    /// Maximum shards executed at the same time
    pub parallel_shards: usize,
    /// Where the JSON artifact is written
    pub report_path: PathBuf,
    /// GitHub Actions integration paths and metadata
    pub github: GithubContext,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            params: InvocationParameters::default(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            fail_on_error: true,
            shard_size: 0,
            parallel_shards: DEFAULT_PARALLEL_SHARDS,
            report_path: PathBuf::from(DEFAULT_REPORT_FILE),
            github: GithubContext::default(),
        }
    }
}

/// GitHub Actions environment used by the renderers.
#[derive(Debug, Clone, Default)]
pub struct GithubContext {
    /// `$GITHUB_OUTPUT` file for step outputs
    pub output_file: Option<PathBuf>,
    /// `$GITHUB_STEP_SUMMARY` file for the job summary
    pub step_summary_file: Option<PathBuf>,
    /// `$GITHUB_RUN_ID`
    pub run_id: Option<String>,
    /// Emit `::error`/`::warning` workflow commands on stdout
    pub annotations: bool,
}
