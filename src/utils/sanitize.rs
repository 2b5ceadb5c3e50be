//! Utilities for sanitizing checker output before it is shown to users.
//!
//! Removes control characters from stderr and stdout payloads and truncates
//! them so error messages and logs stay readable.

use crate::config::MAX_EXCERPT_LENGTH;

/// Sanitizes a message by removing control characters.
///
/// Control characters (0x00-0x1F, except newline/tab/carriage return) garble
/// terminal output and GitHub log rendering. This function removes them while
/// preserving readability.
pub fn sanitize_error_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code >= 0x20 // Printable ASCII starts at 0x20 (space)
                || code == 0x09 // Tab
                || code == 0x0A // Newline
                || code == 0x0D // Carriage return
        })
        .filter(|c| *c != '\u{7f}')
        .collect()
}

/// Sanitizes and truncates a payload to at most [`MAX_EXCERPT_LENGTH`] characters.
///
/// Leading and trailing whitespace is trimmed. When truncated, an indicator with
/// the original length is appended.
pub fn excerpt(payload: &str) -> String {
    let sanitized = sanitize_error_message(payload.trim());
    let length = sanitized.chars().count();

    if length > MAX_EXCERPT_LENGTH {
        // Leave room for the truncation indicator
        let keep = MAX_EXCERPT_LENGTH.saturating_sub(50);
        let head: String = sanitized.chars().take(keep).collect();
        format!("{}... (truncated, original length: {} chars)", head, length)
    } else {
        sanitized
    }
}
