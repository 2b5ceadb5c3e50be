//! Command-line options.
//!
//! Every option doubles as a GitHub Actions input: the action runner exports
//! `with:` inputs as `INPUT_<NAME>` environment variables, which clap reads
//! when the flag is not given. Values from either source count as explicit and
//! override the settings file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::constants::DEFAULT_REPORT_FILE;
use crate::config::file::FileSettings;
use crate::config::types::{
    Config, FailureThreshold, GithubContext, InvocationParameters, LogFormat, LogLevel,
};

/// Parses a GitHub Actions style boolean input.
///
/// Accepts true/false, 1/0, yes/no and on/off in any case.
pub fn parse_bool_input(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(format!(
            "expected one of true/false, 1/0, yes/no, on/off, got '{other}'"
        )),
    }
}

/// Splits a selector list on any whitespace, newlines included.
pub fn split_selectors(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

fn parse_trimmed(value: &str) -> Result<String, String> {
    Ok(value.trim().to_string())
}

fn parse_status_code(value: &str) -> Result<u16, String> {
    let code = value.trim();
    code.parse::<u16>()
        .ok()
        .filter(|c| (100..=599).contains(c))
        .ok_or_else(|| format!("'{code}' is not an HTTP status code (100-599)"))
}

/// Command-line options and GitHub Actions inputs.
///
/// # Examples
///
/// ```bash
/// # Check the repository with defaults
/// urlsup-action
///
/// # Tolerate up to 5% broken links in the docs folder
/// urlsup-action docs --failure-threshold 5 --retry 2
///
/// # Inside a workflow, inputs arrive through the environment
/// INPUT_FILES="README.md docs" INPUT_ALLOW_TIMEOUT=true urlsup-action
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "urlsup-action",
    version,
    about = "Runs urlsup, applies failure thresholds and reports broken URLs to GitHub."
)]
pub struct Opt {
    /// Files or directories to check
    pub files: Vec<String>,

    /// Whitespace separated file selectors, as the action's `files` input
    #[arg(long = "files-input", env = "INPUT_FILES", hide = true)]
    pub files_input: Option<String>,

    /// Checker binary to execute
    #[arg(long, env = "INPUT_CHECKER")]
    pub checker: Option<String>,

    /// Recurse into directories
    #[arg(long, env = "INPUT_RECURSIVE", value_parser = parse_bool_input,
          num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub recursive: Option<bool>,

    /// File extensions to include, comma separated (e.g. md,html)
    #[arg(long = "include", env = "INPUT_INCLUDE_EXTENSIONS", value_delimiter = ',', value_parser = parse_trimmed)]
    pub include_extensions: Option<Vec<String>>,

    /// Per-request timeout in seconds
    #[arg(long, env = "INPUT_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Concurrent requests made by the checker
    #[arg(long, env = "INPUT_CONCURRENCY")]
    pub concurrency: Option<u32>,

    /// Retry attempts for failed requests
    #[arg(long, env = "INPUT_RETRY")]
    pub retry: Option<u32>,

    /// Delay between retries in milliseconds
    #[arg(long, env = "INPUT_RETRY_DELAY")]
    pub retry_delay: Option<u64>,

    /// Delay between requests in milliseconds
    #[arg(long, env = "INPUT_RATE_LIMIT")]
    pub rate_limit: Option<u64>,

    /// URL patterns to allow, comma separated
    #[arg(long, env = "INPUT_ALLOWLIST", value_delimiter = ',', value_parser = parse_trimmed)]
    pub allowlist: Option<Vec<String>>,

    /// Extra HTTP status codes treated as success, comma separated
    #[arg(long, env = "INPUT_ALLOW_STATUS", value_delimiter = ',', value_parser = parse_status_code)]
    pub allow_status: Option<Vec<u16>>,

    /// Regex of URLs to skip
    #[arg(long, env = "INPUT_EXCLUDE_PATTERN")]
    pub exclude_pattern: Option<String>,

    /// Do not fail on timed-out URLs
    #[arg(long, env = "INPUT_ALLOW_TIMEOUT", value_parser = parse_bool_input,
          num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub allow_timeout: Option<bool>,

    /// Maximum percentage of broken URLs tolerated (e.g. 5 or 5%)
    #[arg(long, env = "INPUT_FAILURE_THRESHOLD")]
    pub failure_threshold: Option<FailureThreshold>,

    /// User-Agent header sent by the checker
    #[arg(long, env = "INPUT_USER_AGENT")]
    pub user_agent: Option<String>,

    /// HTTP(S) proxy URL
    #[arg(long, env = "INPUT_PROXY")]
    pub proxy: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, env = "INPUT_INSECURE", value_parser = parse_bool_input,
          num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub insecure: Option<bool>,

    /// Ask the checker for minimal output
    #[arg(long, env = "INPUT_QUIET", value_parser = parse_bool_input,
          num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub quiet: Option<bool>,

    /// Ask the checker for verbose output
    #[arg(long, env = "INPUT_VERBOSE", value_parser = parse_bool_input,
          num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub verbose: Option<bool>,

    /// Checker configuration file, passed through to the checker
    #[arg(long, env = "INPUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ignore any checker configuration file
    #[arg(long, env = "INPUT_NO_CONFIG", value_parser = parse_bool_input,
          num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub no_config: Option<bool>,

    /// Settings file for this action (TOML); flags override it
    #[arg(long, env = "INPUT_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Wall-clock limit for a checker run in seconds (derived when unset)
    #[arg(long, env = "INPUT_RUN_TIMEOUT")]
    pub run_timeout: Option<u64>,

    /// URL count assumed when deriving the run time limit
    #[arg(long, env = "INPUT_EXPECTED_URLS")]
    pub expected_urls: Option<u32>,

    /// Exit non-zero when the run fails
    #[arg(long, env = "INPUT_FAIL_ON_ERROR", value_parser = parse_bool_input,
          num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub fail_on_error: Option<bool>,

    /// Split file selectors into shards of this many entries (0 disables)
    #[arg(long, env = "INPUT_SHARD_SIZE")]
    pub shard_size: Option<usize>,

    /// Maximum shards checked at the same time
    #[arg(long, env = "INPUT_PARALLEL_SHARDS")]
    pub parallel_shards: Option<usize>,

    /// Where to write the JSON report artifact
    #[arg(long, env = "INPUT_REPORT_PATH")]
    pub report_path: Option<PathBuf>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, env = "INPUT_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Log format: plain|json
    #[arg(long, value_enum, env = "INPUT_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Step outputs file
    #[arg(long, env = "GITHUB_OUTPUT", hide = true)]
    pub github_output: Option<PathBuf>,

    /// Job summary file
    #[arg(long, env = "GITHUB_STEP_SUMMARY", hide = true)]
    pub github_step_summary: Option<PathBuf>,

    /// Workflow run id shown in the job summary
    #[arg(long, env = "GITHUB_RUN_ID", hide = true)]
    pub github_run_id: Option<String>,

    /// Workspace directory the default report path is relative to
    #[arg(long, env = "GITHUB_WORKSPACE", hide = true)]
    pub github_workspace: Option<PathBuf>,

    /// Running inside GitHub Actions: emit workflow commands
    #[arg(long, env = "GITHUB_ACTIONS", value_parser = parse_bool_input,
          num_args = 0..=1, require_equals = true, default_missing_value = "true", hide = true)]
    pub github_actions: Option<bool>,
}

impl Opt {
    /// Resolves the options into a [`Config`], loading the settings file if one
    /// is named.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be loaded or the merged
    /// parameters fail validation.
    pub fn into_config(self) -> Result<Config> {
        let settings = match &self.settings {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };
        let config = self.merge(settings);
        config
            .params
            .validate()
            .context("Invalid configuration")?;
        Ok(config)
    }

    /// Merges explicit options over the settings file over defaults.
    pub fn merge(self, file: FileSettings) -> Config {
        let defaults = Config::default();
        let base = defaults.params;

        let input_files = self
            .files_input
            .as_deref()
            .map(split_selectors)
            .filter(|files| !files.is_empty());
        let files = if self.files.is_empty() {
            input_files.or(file.files).unwrap_or(base.files)
        } else {
            self.files
        };

        let params = InvocationParameters {
            checker: self.checker.or(file.checker).unwrap_or(base.checker),
            files,
            recursive: self.recursive.or(file.recursive).unwrap_or(base.recursive),
            include_extensions: self
                .include_extensions
                .or(file.include_extensions)
                .unwrap_or(base.include_extensions),
            timeout_secs: self.timeout.or(file.timeout).unwrap_or(base.timeout_secs),
            concurrency: self.concurrency.or(file.concurrency).or(base.concurrency),
            retry: self.retry.or(file.retry).unwrap_or(base.retry),
            retry_delay_ms: self.retry_delay.or(file.retry_delay).or(base.retry_delay_ms),
            rate_limit_ms: self
                .rate_limit
                .or(file.rate_limit)
                .unwrap_or(base.rate_limit_ms),
            allowlist: self.allowlist.or(file.allowlist).unwrap_or(base.allowlist),
            allow_status: self
                .allow_status
                .or(file.allow_status)
                .unwrap_or(base.allow_status),
            exclude_pattern: self
                .exclude_pattern
                .or(file.exclude_pattern)
                .or(base.exclude_pattern),
            allow_timeout: self
                .allow_timeout
                .or(file.allow_timeout)
                .unwrap_or(base.allow_timeout),
            failure_threshold: self
                .failure_threshold
                .or(file.failure_threshold)
                .or(base.failure_threshold),
            user_agent: self.user_agent.or(file.user_agent).or(base.user_agent),
            proxy: self.proxy.or(file.proxy).or(base.proxy),
            insecure: self.insecure.or(file.insecure).unwrap_or(base.insecure),
            quiet: self.quiet.or(file.quiet).unwrap_or(base.quiet),
            verbose: self.verbose.or(file.verbose).unwrap_or(base.verbose),
            checker_config: self.config.or(file.config).or(base.checker_config),
            no_checker_config: self
                .no_config
                .or(file.no_config)
                .unwrap_or(base.no_checker_config),
            run_timeout: self
                .run_timeout
                .or(file.run_timeout)
                .map(Duration::from_secs)
                .or(base.run_timeout),
            expected_urls: self
                .expected_urls
                .or(file.expected_urls)
                .unwrap_or(base.expected_urls),
        };

        let report_path = self
            .report_path
            .or(file.report_path)
            .unwrap_or_else(|| match &self.github_workspace {
                Some(workspace) => workspace.join(DEFAULT_REPORT_FILE),
                None => defaults.report_path.clone(),
            });

        Config {
            params,
            log_level: self
                .log_level
                .or(file.log_level)
                .unwrap_or(defaults.log_level),
            log_format: self
                .log_format
                .or(file.log_format)
                .unwrap_or(defaults.log_format),
            fail_on_error: self
                .fail_on_error
                .or(file.fail_on_error)
                .unwrap_or(defaults.fail_on_error),
            shard_size: self
                .shard_size
                .or(file.shard_size)
                .unwrap_or(defaults.shard_size),
            parallel_shards: self
                .parallel_shards
                .or(file.parallel_shards)
                .unwrap_or(defaults.parallel_shards)
                .max(1),
            report_path,
            github: GithubContext {
                output_file: self.github_output,
                step_summary_file: self.github_step_summary,
                run_id: self.github_run_id,
                annotations: self.github_actions.unwrap_or(false),
            },
        }
    }
}
