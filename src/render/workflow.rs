//! GitHub workflow commands (`::error file=...::message`).

use std::io::{self, Write};

use crate::annotate::{Annotation, Severity};
use crate::config::MAX_DEGRADED_ANNOTATIONS;
use crate::utils::normalize_file_path;

/// Escapes a workflow command message.
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escapes a workflow command property value.
fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Formats a workflow command such as `::warning title=x::message`.
pub fn workflow_command(severity: Severity, properties: &[(&str, String)], message: &str) -> String {
    let properties = properties
        .iter()
        .map(|(key, value)| format!("{}={}", key, escape_property(value)))
        .collect::<Vec<_>>()
        .join(",");
    if properties.is_empty() {
        format!("::{}::{}", severity, escape_data(message))
    } else {
        format!("::{} {}::{}", severity, properties, escape_data(message))
    }
}

/// Formats one annotation as a workflow command.
///
/// Annotations without a file are shown at job level. Missing line numbers
/// default to 1 so GitHub still links the file.
pub fn annotation_command(annotation: &Annotation) -> String {
    let file = normalize_file_path(&annotation.location.file);
    let mut properties = Vec::new();
    if !file.is_empty() && file != "." {
        properties.push(("file", file));
        properties.push(("line", annotation.location.line.unwrap_or(1).to_string()));
    }
    properties.push(("title", annotation.cause.title().to_string()));
    workflow_command(
        annotation.severity,
        &properties,
        &format!("{}. {}", annotation.message, annotation.hint),
    )
}

/// Writes annotations as workflow commands, one per line.
///
/// Reports from the degraded text scan emit at most
/// [`MAX_DEGRADED_ANNOTATIONS`] commands. Returns the number written.
pub fn write_annotations<W: Write>(
    out: &mut W,
    annotations: &[Annotation],
    degraded: bool,
) -> io::Result<usize> {
    let limit = if degraded {
        MAX_DEGRADED_ANNOTATIONS
    } else {
        annotations.len()
    };
    let mut written = 0;
    for annotation in annotations.iter().take(limit) {
        writeln!(out, "{}", annotation_command(annotation))?;
        written += 1;
    }
    if written < annotations.len() {
        log::info!(
            "Emitted {} of {} annotations (best-effort report)",
            written,
            annotations.len()
        );
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{derive, Cause};
    use crate::report::{SourceLocation, UrlOutcome, UrlRecord};

    fn annotation(file: &str, line: Option<u32>, outcome: UrlOutcome) -> Annotation {
        derive(&[UrlRecord {
            url: "https://x.io/a,b".to_string(),
            location: SourceLocation::new(file, line),
            outcome,
            status_code: Some(404),
            error: Some("Not Found\nreally".to_string()),
        }])
        .remove(0)
    }

    #[test]
    fn test_error_command() {
        let command = annotation_command(&annotation("./docs/../README.md", Some(12), UrlOutcome::Broken));
        assert!(command.starts_with("::error file=README.md,line=12,title=Broken URL::"));
        assert!(command.contains("Broken URL: https://x.io/a,b (HTTP 404) - Not Found%0Areally"));
        assert!(!command.contains('\n'));
    }

    #[test]
    fn test_missing_line_defaults_to_one() {
        let command = annotation_command(&annotation("a.md", None, UrlOutcome::Broken));
        assert!(command.starts_with("::error file=a.md,line=1,"));
    }

    #[test]
    fn test_timed_out_is_warning_without_file() {
        let mut a = annotation("", None, UrlOutcome::TimedOut);
        a.cause = Cause::Timeout;
        let command = annotation_command(&a);
        assert!(command.starts_with("::warning title=Timed out::"));
    }

    #[test]
    fn test_property_escaping() {
        let command = workflow_command(
            Severity::Error,
            &[("file", "dir,x/a:b.md".to_string())],
            "100% broken",
        );
        assert_eq!(command, "::error file=dir%2Cx/a%3Ab.md::100%25 broken");
    }

    #[test]
    fn test_degraded_annotations_are_capped() {
        let annotations: Vec<_> = (0..15)
            .map(|i| annotation("a.md", Some(i), UrlOutcome::Broken))
            .collect();

        let mut out = Vec::new();
        assert_eq!(write_annotations(&mut out, &annotations, true).unwrap(), 10);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 10);

        let mut out = Vec::new();
        assert_eq!(write_annotations(&mut out, &annotations, false).unwrap(), 15);
    }
}
