//! Degraded-mode scan of non-JSON checker output.
//!
//! Used only when no structured schema matches. Every report produced here is
//! marked degraded: the counts are reconstructed from whatever the text
//! mentions and deserve lower confidence.

use std::sync::LazyLock;

use regex::Regex;

use super::builder::ReportSummary;
use super::schema::{is_timeout_text, ParsedReport};
use super::model::{SourceLocation, UrlOutcome, UrlRecord};

const URL_PATTERN: &str = r#"https?://[^\s<>"']+[^\s<>"'.,)]"#;
const STATUS_PATTERN: &str = r"\b([1-5][0-9]{2})\b";
const LOCATOR_PATTERN: &str = r"([A-Za-z0-9_./\\-]+\.[A-Za-z0-9]+):([0-9]+)";
const SUCCESS_PATTERN: &str = r"(?i)(✓|✔|\bok\b|\bsuccess(ful)?\b|\bpassed\b)";
const FOUND_PATTERN: &str = r"(?i)\b([0-9]+)\s+(unique\s+)?urls?\s+found\b";
const FAILED_PATTERN: &str = r"(?i)\b([0-9]+)\s+(failed|issues?|broken)\b";

/// Maximum length of the per-line error text kept on a record.
const MAX_LINE_ERROR_LENGTH: usize = 200;

/// Compiles a regex pattern that is known to be valid at compile time.
///
/// # Panics
///
/// Panics if the pattern is invalid, which indicates a programming error.
fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}

static URL_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex_unsafe(URL_PATTERN, "URL_RE"));
static STATUS_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(STATUS_PATTERN, "STATUS_RE"));
static LOCATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(LOCATOR_PATTERN, "LOCATOR_RE"));
static SUCCESS_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(SUCCESS_PATTERN, "SUCCESS_RE"));
static FOUND_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex_unsafe(FOUND_PATTERN, "FOUND_RE"));
static FAILED_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(FAILED_PATTERN, "FAILED_RE"));

/// Scans free text for URL tokens, status indicators and summary hints.
///
/// Returns `None` when the text contains nothing recognizable.
pub(crate) fn scan(raw: &str) -> Option<ParsedReport> {
    let mut records = Vec::new();
    let mut summary = ReportSummary::default();

    for line in raw.lines() {
        let urls: Vec<&str> = URL_RE.find_iter(line).map(|m| m.as_str()).collect();

        if urls.is_empty() {
            // Summary lines never carry URLs; the first figure of each kind wins.
            if summary.total_found.is_none() {
                summary.total_found = capture_number(&FOUND_RE, line);
            }
            if summary.broken_hint.is_none() {
                summary.broken_hint = capture_number(&FAILED_RE, line);
            }
            continue;
        }

        // Indicators are searched outside the URLs so digits in paths or ports
        // are not mistaken for status codes.
        let rest = URL_RE.replace_all(line, " ");
        let location = LOCATOR_RE
            .captures(&rest)
            .map(|c| SourceLocation::new(&c[1], c[2].parse().ok()))
            .unwrap_or_else(|| SourceLocation::new("", None));
        let without_locator = LOCATOR_RE.replace_all(&rest, " ");
        let status_code = STATUS_RE
            .captures(&without_locator)
            .and_then(|c| c[1].parse::<u16>().ok());

        let outcome = line_outcome(&without_locator, status_code);
        let error = match outcome {
            UrlOutcome::Ok => None,
            _ => line_error(&without_locator),
        };

        for url in urls {
            records.push(UrlRecord {
                url: url.to_string(),
                location: location.clone(),
                outcome,
                status_code,
                error: error.clone(),
            });
        }
    }

    if records.is_empty() && summary.total_found.is_none() && summary.broken_hint.is_none() {
        return None;
    }
    Some(ParsedReport { records, summary })
}

fn capture_number(re: &Regex, line: &str) -> Option<usize> {
    re.captures(line).and_then(|c| c[1].parse().ok())
}

fn line_outcome(text: &str, status_code: Option<u16>) -> UrlOutcome {
    match status_code {
        Some(code) if code >= 400 => UrlOutcome::Broken,
        _ if is_timeout_text(text) => UrlOutcome::TimedOut,
        Some(_) => UrlOutcome::Ok,
        None if SUCCESS_RE.is_match(text) => UrlOutcome::Ok,
        None => UrlOutcome::Broken,
    }
}

/// Leftover line text, stripped of list markers and punctuation.
fn line_error(text: &str) -> Option<String> {
    let trimmed = text
        .trim_matches(|c: char| c.is_whitespace() || "-*•✗✘×:()[]0123456789.".contains(c))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_LINE_ERROR_LENGTH).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_extracts_urls_and_hints() {
        let raw = "\
Checking 12 files...
Found 10 URLs found in total
  ✗ https://broken.example.org/page (404) README.md:12
  ✗ https://slow.io - connection timed out docs/guide.md:3
  ✓ https://ok.io/path. 200
3 failed
";
        let parsed = scan(raw).unwrap();
        assert_eq!(parsed.summary.total_found, Some(10));
        assert_eq!(parsed.summary.broken_hint, Some(3));
        assert_eq!(parsed.records.len(), 3);

        let broken = &parsed.records[0];
        assert_eq!(broken.url, "https://broken.example.org/page");
        assert_eq!(broken.outcome, UrlOutcome::Broken);
        assert_eq!(broken.status_code, Some(404));
        assert_eq!(broken.location, SourceLocation::new("README.md", Some(12)));

        let slow = &parsed.records[1];
        assert_eq!(slow.outcome, UrlOutcome::TimedOut);
        assert_eq!(slow.location, SourceLocation::new("docs/guide.md", Some(3)));
        assert_eq!(slow.error.as_deref(), Some("connection timed out"));

        let ok = &parsed.records[2];
        assert_eq!(ok.url, "https://ok.io/path");
        assert_eq!(ok.outcome, UrlOutcome::Ok);
        assert_eq!(ok.error, None);
    }

    #[test]
    fn test_bare_url_is_broken() {
        let parsed = scan("https://example.com/missing").unwrap();
        assert_eq!(parsed.records[0].outcome, UrlOutcome::Broken);
        assert_eq!(parsed.records[0].location, SourceLocation::new("", None));
        assert_eq!(parsed.records[0].status_code, None);
    }

    #[test]
    fn test_port_digits_are_not_status_codes() {
        let parsed = scan("https://localhost:404/x").unwrap();
        assert_eq!(parsed.records[0].status_code, None);
    }

    #[test]
    fn test_hints_without_urls() {
        let parsed = scan("5 URLs found\n0 issues").unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.summary.total_found, Some(5));
        assert_eq!(parsed.summary.broken_hint, Some(0));
    }

    #[test]
    fn test_unrecognizable_text() {
        assert!(scan("segmentation fault (core dumped)").is_none());
        assert!(scan("{\"unexpected\": true}").is_none());
    }
}
