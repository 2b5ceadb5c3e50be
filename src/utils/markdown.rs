//! Escaping for text placed in markdown tables.

/// Escapes a value for use inside a markdown table cell.
///
/// Pipes would end the cell and newlines would end the row.
pub fn escape_markdown(text: &str) -> String {
    text.replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a|b"), "a\\|b");
        assert_eq!(escape_markdown("line1\nline2\r\nline3"), "line1 line2 line3");
        assert_eq!(escape_markdown("plain"), "plain");
    }
}
