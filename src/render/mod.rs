//! Rendering surfaces.
//!
//! This module provides:
//! - GitHub workflow commands for annotations
//! - Step outputs and job summary markdown
//! - The JSON report artifact
//! - A console summary
//! - Publishing a run to all of the above

mod console;
mod json;
mod outputs;
mod publish;
mod summary;
mod workflow;

pub use console::{log_summary, summary_line};
pub use json::write_artifact;
pub use outputs::{append_outputs, format_outputs, step_outputs};
pub use publish::{publish_error, publish_report};
pub use summary::{append_summary, error_summary, job_summary, progress_bar};
pub use workflow::{annotation_command, workflow_command, write_annotations};
