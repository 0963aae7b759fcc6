//! Timestamped artifact files.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

use job_copilot_core::prompts::Artifact;

/// Timestamp prefix format, local time.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `<ts>_<stem>.md`
pub fn artifact_file_name(ts: &DateTime<Local>, artifact: Artifact) -> String {
    format!("{}_{}.md", ts.format(TIMESTAMP_FORMAT), artifact.file_stem())
}

/// Write each `(artifact, text)` pair into `dir` under one shared
/// timestamp. Returns the written paths in input order.
pub fn write_artifacts(
    dir: &Path,
    ts: &DateTime<Local>,
    outputs: &[(Artifact, &str)],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let mut written = Vec::with_capacity(outputs.len());
    for (artifact, text) in outputs {
        let path = dir.join(artifact_file_name(ts, *artifact));
        std::fs::write(&path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
