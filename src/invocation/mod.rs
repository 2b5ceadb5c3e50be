//! Checker invocation.
//!
//! This module provides:
//! - A typed argument-list builder (no shell interpolation)
//! - The [`ProcessExecutor`] seam and the system implementation
//! - Process-tree cancellation for runs that exceed their budget

mod command;
mod executor;

pub use command::{build_invocation, build_invocation_for, Invocation};
pub use executor::{kill_process_tree, ProcessExecutor, ProcessOutput, SystemExecutor};
