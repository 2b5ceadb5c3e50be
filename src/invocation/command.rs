//! Checker command-line construction.

use std::fmt;

use crate::config::InvocationParameters;

/// A program and its argument list, executed without a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Quotes an argument for display when a shell would split or expand it.
fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,%@+".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Renders the invocation as a copy-pasteable shell command.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

/// Builds the checker invocation for `params` over `files`.
///
/// Flags always appear in the same order so logs of two runs diff cleanly.
/// Options at their "disabled" value (zero retries, zero rate limit, unset
/// strings) are omitted so the checker's own defaults apply.
pub fn build_invocation_for(params: &InvocationParameters, files: &[String]) -> Invocation {
    let mut args: Vec<String> = files.to_vec();

    let mut flag = |name: &str, value: Option<String>| {
        args.push(name.to_string());
        if let Some(value) = value {
            args.push(value);
        }
    };

    if params.recursive {
        flag("--recursive", None);
    }
    if !params.include_extensions.is_empty() {
        flag("--include", Some(params.include_extensions.join(",")));
    }
    flag("--timeout", Some(params.timeout_secs.to_string()));
    if let Some(concurrency) = params.concurrency {
        flag("--concurrency", Some(concurrency.to_string()));
    }
    if params.retry > 0 {
        flag("--retry", Some(params.retry.to_string()));
        if let Some(delay) = params.retry_delay_ms {
            flag("--retry-delay", Some(delay.to_string()));
        }
    }
    if params.rate_limit_ms > 0 {
        flag("--rate-limit", Some(params.rate_limit_ms.to_string()));
    }
    if !params.allowlist.is_empty() {
        flag("--allowlist", Some(params.allowlist.join(",")));
    }
    if !params.allow_status.is_empty() {
        let codes: Vec<String> = params.allow_status.iter().map(u16::to_string).collect();
        flag("--allow-status", Some(codes.join(",")));
    }
    if let Some(pattern) = &params.exclude_pattern {
        flag("--exclude-pattern", Some(pattern.clone()));
    }
    if params.allow_timeout {
        flag("--allow-timeout", None);
    }
    if let Some(user_agent) = &params.user_agent {
        flag("--user-agent", Some(user_agent.clone()));
    }
    if let Some(proxy) = &params.proxy {
        flag("--proxy", Some(proxy.clone()));
    }
    if params.insecure {
        flag("--insecure", None);
    }
    if params.no_checker_config {
        flag("--no-config", None);
    } else if let Some(config) = &params.checker_config {
        flag("--config", Some(config.display().to_string()));
    }
    if params.quiet {
        flag("--quiet", None);
    }
    if params.verbose {
        flag("--verbose", None);
    }
    flag("--format", Some("json".to_string()));
    flag("--no-progress", None);

    Invocation::new(params.checker.clone(), args)
}

/// Builds the checker invocation for all of `params.files`.
pub fn build_invocation(params: &InvocationParameters) -> Invocation {
    build_invocation_for(params, &params.files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailureThreshold;
    use std::path::PathBuf;

    fn args(invocation: &Invocation) -> Vec<&str> {
        invocation.args().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_default_invocation() {
        let invocation = build_invocation(&InvocationParameters::default());
        assert_eq!(invocation.program(), "urlsup");
        assert_eq!(
            args(&invocation),
            vec![".", "--recursive", "--timeout", "5", "--format", "json", "--no-progress"]
        );
    }

    #[test]
    fn test_full_invocation_order() {
        let params = InvocationParameters {
            files: vec!["README.md".to_string(), "docs".to_string()],
            recursive: false,
            include_extensions: vec!["md".to_string(), "rst".to_string()],
            timeout_secs: 10,
            concurrency: Some(20),
            retry: 2,
            retry_delay_ms: Some(500),
            rate_limit_ms: 100,
            allowlist: vec!["localhost".to_string(), "example.com".to_string()],
            allow_status: vec![403, 429],
            exclude_pattern: Some(r".*\.local.*".to_string()),
            allow_timeout: true,
            failure_threshold: Some(FailureThreshold::new(5.0).unwrap()),
            user_agent: Some("bot/1.0 (ci)".to_string()),
            proxy: Some("http://proxy:8080".to_string()),
            insecure: true,
            checker_config: Some(PathBuf::from(".urlsup.toml")),
            verbose: true,
            ..Default::default()
        };
        let invocation = build_invocation(&params);
        assert_eq!(
            args(&invocation),
            vec![
                "README.md",
                "docs",
                "--include",
                "md,rst",
                "--timeout",
                "10",
                "--concurrency",
                "20",
                "--retry",
                "2",
                "--retry-delay",
                "500",
                "--rate-limit",
                "100",
                "--allowlist",
                "localhost,example.com",
                "--allow-status",
                "403,429",
                "--exclude-pattern",
                r".*\.local.*",
                "--allow-timeout",
                "--user-agent",
                "bot/1.0 (ci)",
                "--proxy",
                "http://proxy:8080",
                "--insecure",
                "--config",
                ".urlsup.toml",
                "--verbose",
                "--format",
                "json",
                "--no-progress",
            ]
        );
    }

    #[test]
    fn test_no_config_wins_over_config_path() {
        let params = InvocationParameters {
            checker_config: Some(PathBuf::from("x.toml")),
            no_checker_config: true,
            ..Default::default()
        };
        let invocation = build_invocation(&params);
        assert!(invocation.args().contains(&"--no-config".to_string()));
        assert!(!invocation.args().contains(&"--config".to_string()));
    }

    #[test]
    fn test_retry_delay_omitted_without_retries() {
        let params = InvocationParameters {
            retry_delay_ms: Some(1000),
            ..Default::default()
        };
        assert!(!build_invocation(&params)
            .args()
            .contains(&"--retry-delay".to_string()));
    }

    #[test]
    fn test_build_for_subset_of_files() {
        let params = InvocationParameters {
            files: vec!["a.md".to_string(), "b.md".to_string()],
            ..Default::default()
        };
        let invocation = build_invocation_for(&params, &["b.md".to_string()]);
        assert_eq!(invocation.args()[0], "b.md");
        assert_ne!(invocation.args()[1], "a.md");
    }

    #[test]
    fn test_display_quotes_when_needed() {
        let invocation = Invocation::new(
            "urlsup",
            vec![
                "docs".to_string(),
                "--user-agent".to_string(),
                "bot/1.0 (ci)".to_string(),
                "--exclude-pattern".to_string(),
                "it's".to_string(),
                String::new(),
            ],
        );
        assert_eq!(
            invocation.to_string(),
            r"urlsup docs --user-agent 'bot/1.0 (ci)' --exclude-pattern 'it'\''s' ''"
        );
    }
}
