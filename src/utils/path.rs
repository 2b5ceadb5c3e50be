//! File path normalization for annotation targets.

/// Normalizes a checker-reported path into the repository-relative form
/// GitHub expects in annotations.
///
/// Strips leading `./`, resolves `.` and `..` segments lexically and converts
/// backslashes to forward slashes. `..` segments that would climb above the
/// root are kept. Absolute paths stay absolute.
pub fn normalize_file_path(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    if unified.is_empty() {
        return unified;
    }
    let absolute = unified.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_current_dir_prefix() {
        assert_eq!(normalize_file_path("./README.md"), "README.md");
        assert_eq!(normalize_file_path("././docs/a.md"), "docs/a.md");
    }

    #[test]
    fn test_resolves_parent_segments() {
        assert_eq!(normalize_file_path("docs/../README.md"), "README.md");
        assert_eq!(normalize_file_path("a/b/./c/../d.md"), "a/b/d.md");
        assert_eq!(normalize_file_path("../outside.md"), "../outside.md");
        assert_eq!(normalize_file_path("/abs/../x.md"), "/x.md");
        assert_eq!(normalize_file_path("/../x.md"), "/x.md");
    }

    #[test]
    fn test_windows_separators() {
        assert_eq!(normalize_file_path(".\\docs\\guide.md"), "docs/guide.md");
    }

    #[test]
    fn test_degenerate_paths() {
        assert_eq!(normalize_file_path(""), "");
        assert_eq!(normalize_file_path("."), ".");
        assert_eq!(normalize_file_path("docs/.."), ".");
    }
}
