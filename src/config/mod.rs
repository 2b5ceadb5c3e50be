//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, budgets, rendering caps)
//! - Typed run parameters and their validation
//! - CLI option parsing and the TOML settings file

mod constants;
mod file;
mod options;
mod types;

// Re-export all constants
pub use constants::*;
pub use file::FileSettings;
pub use options::{parse_bool_input, split_selectors, Opt};
pub use types::{
    Config, ConfigValidationError, FailureThreshold, GithubContext, InvocationParameters,
    LogFormat, LogLevel,
};
