//! Step outputs written to `$GITHUB_OUTPUT`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::run::RunReport;

/// Output names and values for a finished run.
///
/// `exit_code` is the code the action itself will exit with.
pub fn step_outputs(run: &RunReport, exit_code: i32, report_path: &Path) -> Vec<(&'static str, String)> {
    let artifact = run.artifact();
    vec![
        ("total-urls", artifact.total_urls.to_string()),
        ("broken-urls", artifact.broken_urls.to_string()),
        ("success-rate", format!("{:.1}%", artifact.success_rate)),
        ("exit-code", exit_code.to_string()),
        ("report-path", report_path.display().to_string()),
    ]
}

/// Formats outputs in the `name=value` file syntax, using the delimiter
/// syntax for values that span lines.
pub fn format_outputs(outputs: &[(&str, String)]) -> String {
    let mut content = String::new();
    for (name, value) in outputs {
        if value.contains('\n') {
            let delimiter = format!("URLSUP_EOF_{}", chrono::Utc::now().timestamp_millis());
            content.push_str(&format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"));
        } else {
            content.push_str(&format!("{name}={value}\n"));
        }
    }
    content
}

/// Appends outputs to the file GitHub reads step outputs from.
pub fn append_outputs(path: &Path, outputs: &[(&str, String)]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open step output file: {}", path.display()))?;
    file.write_all(format_outputs(outputs).as_bytes())
        .with_context(|| format!("Failed to write step outputs to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_single_line_values() {
        let content = format_outputs(&[
            ("total-urls", "100".to_string()),
            ("success-rate", "97.0%".to_string()),
        ]);
        assert_eq!(content, "total-urls=100\nsuccess-rate=97.0%\n");
    }

    #[test]
    fn test_format_multi_line_value() {
        let content = format_outputs(&[("report-path", "a\nb".to_string())]);
        let mut lines = content.lines();
        let header = lines.next().unwrap();
        let (name, delimiter) = header.split_once("<<").unwrap();
        assert_eq!(name, "report-path");
        assert_eq!(lines.next(), Some("a"));
        assert_eq!(lines.next(), Some("b"));
        assert_eq!(lines.next(), Some(delimiter));
    }

    #[test]
    fn test_append_outputs_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "previous=1\n").unwrap();
        append_outputs(&path, &[("exit-code", "0".to_string())]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "previous=1\nexit-code=0\n"
        );
    }
}
