//! Utility functions for presenting checker output.
//!
//! This module provides:
//! - String sanitization and payload excerpts
//! - File path normalization for annotations
//! - Markdown escaping for job summaries

mod markdown;
mod path;
pub mod sanitize;

pub use markdown::escape_markdown;
pub use path::normalize_file_path;
pub use sanitize::{excerpt, sanitize_error_message};
