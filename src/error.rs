//! Errors surfaced by the generation pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// No profile file exists. Raised before any indexing or generation.
    #[error(
        "no profile configured: create {} (run `jcp init` for a starter profile)",
        path.display()
    )]
    ProfileNotConfigured { path: PathBuf },

    /// A model call exceeded `llm.timeout_secs`.
    #[error("{task} timed out after {secs}s")]
    Timeout { task: String, secs: u64 },

    /// Any failure from the store, embedder, model, or filesystem.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl PipelineError {
    /// Stable machine-readable code used by the HTTP API.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::ProfileNotConfigured { .. } => "profile_not_configured",
            PipelineError::Timeout { .. } => "timeout",
            PipelineError::Collaborator(_) => "internal",
        }
    }
}
