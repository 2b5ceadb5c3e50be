//! TOML settings file.
//!
//! Every option of the command line can also be set in a settings file. Values
//! given explicitly on the command line (or through the `INPUT_*` environment)
//! take precedence over the file; the file takes precedence over defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::types::{FailureThreshold, LogFormat, LogLevel};

/// Options read from a settings file. Absent keys leave the value unset.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSettings {
    pub checker: Option<String>,
    pub files: Option<Vec<String>>,
    pub recursive: Option<bool>,
    pub include_extensions: Option<Vec<String>>,
    pub timeout: Option<u64>,
    pub concurrency: Option<u32>,
    pub retry: Option<u32>,
    pub retry_delay: Option<u64>,
    pub rate_limit: Option<u64>,
    pub allowlist: Option<Vec<String>>,
    pub allow_status: Option<Vec<u16>>,
    pub exclude_pattern: Option<String>,
    pub allow_timeout: Option<bool>,
    pub failure_threshold: Option<FailureThreshold>,
    pub user_agent: Option<String>,
    pub proxy: Option<String>,
    pub insecure: Option<bool>,
    pub quiet: Option<bool>,
    pub verbose: Option<bool>,
    pub config: Option<PathBuf>,
    pub no_config: Option<bool>,
    pub run_timeout: Option<u64>,
    pub expected_urls: Option<u32>,
    pub fail_on_error: Option<bool>,
    pub shard_size: Option<usize>,
    pub parallel_shards: Option<usize>,
    pub report_path: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    pub log_format: Option<LogFormat>,
}

impl FileSettings {
    /// Parses settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML, unknown keys, or out-of-range values.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse settings file")
    }

    /// Reads and parses a settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid settings in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_settings() {
        let settings = FileSettings::from_toml(
            r#"
            files = ["README.md", "docs"]
            recursive = false
            include-extensions = ["md", "rst"]
            timeout = 10
            retry = 2
            allow-status = [200, 429]
            failure-threshold = "5%"
            fail-on-error = false
            log-level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(
            settings.files,
            Some(vec!["README.md".to_string(), "docs".to_string()])
        );
        assert_eq!(settings.recursive, Some(false));
        assert_eq!(settings.timeout, Some(10));
        assert_eq!(settings.retry, Some(2));
        assert_eq!(settings.allow_status, Some(vec![200, 429]));
        assert_eq!(settings.failure_threshold.map(|t| t.percent()), Some(5.0));
        assert_eq!(settings.fail_on_error, Some(false));
        assert_eq!(settings.log_level, Some(LogLevel::Debug));
        assert!(settings.proxy.is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = FileSettings::from_toml("timeuot = 3").unwrap_err();
        assert!(format!("{err:#}").contains("timeuot"));
    }

    #[test]
    fn test_invalid_threshold_is_rejected() {
        assert!(FileSettings::from_toml("failure-threshold = 150").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "concurrency = 8").unwrap();
        let settings = FileSettings::load(file.path()).unwrap();
        assert_eq!(settings.concurrency, Some(8));
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = FileSettings::load(Path::new("/nonexistent/settings.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/settings.toml"));
    }
}
