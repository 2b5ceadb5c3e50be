//! Error handling.
//!
//! This module provides the fatal error taxonomy of a run:
//! - **Invocation errors**: the checker could not be started or exited without output
//! - **Timeout errors**: the checker exceeded its wall-clock budget
//! - **Parse errors**: the checker output is empty or wholly unrecognizable
//!
//! Broken URLs and exceeded thresholds are not errors; they are part of the
//! [`Outcome`](crate::Outcome).

mod types;

// Re-export public API
pub use types::{
    ExecutionError, InitializationError, InvocationFailure, ParseError, ParseFailure, RunError,
    RunErrorKind,
};
