//! JSON report artifact.

use std::path::Path;

use anyhow::{Context, Result};

use crate::run::OutcomeArtifact;

/// Writes the outcome artifact as pretty-printed JSON, creating parent
/// directories as needed.
pub fn write_artifact(path: &Path, artifact: &OutcomeArtifact<'_>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(artifact).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    log::debug!("Report written to {}", path.display());
    Ok(())
}
