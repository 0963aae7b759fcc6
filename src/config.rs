//! TOML configuration.
//!
//! Every section and key has a default, so an empty file (or no file at
//! all, see [`load_or_default`]) yields a working local setup: SQLite under
//! `data/job_rag/`, keyword retrieval, and Ollama for generation.
//!
//! ```toml
//! [data]
//! base_dir = "data"
//!
//! [embedding]
//! provider = "ollama"
//! model = "all-minilm"
//! dims = 384
//!
//! [llm]
//! provider = "ollama"
//! model = "llama3.2:3b"
//! ```
//!
//! After parsing, `OLLAMA_HOST` and `LLM_MODEL` from the environment
//! override `llm.url` (Ollama only) and `llm.model`.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use job_copilot_core::chunk::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use job_copilot_core::retrieval::{DEFAULT_CANDIDATE_K, DEFAULT_TOP_K};

pub const DEFAULT_CONFIG_PATH: &str = "config/jcp.toml";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub db: DbConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DataConfig {
    pub base_dir: PathBuf,
    pub outputs_dir: String,
    pub rag_dir: String,
    pub profile_subdir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("data"),
            outputs_dir: "outputs".to_string(),
            rag_dir: "job_rag".to_string(),
            profile_subdir: "profile_docs".to_string(),
        }
    }
}

impl DataConfig {
    /// Directory generated artifacts are written to.
    pub fn outputs_path(&self) -> PathBuf {
        self.base_dir.join(&self.outputs_dir)
    }

    /// Working directory for the store, the profile file and `jd.txt`.
    pub fn rag_path(&self) -> PathBuf {
        self.base_dir.join(&self.rag_dir)
    }

    /// Directory scanned for CVs and other profile documents.
    pub fn profile_docs_path(&self) -> PathBuf {
        self.rag_path().join(&self.profile_subdir)
    }

    /// JSON file holding the candidate profile.
    pub fn profile_file(&self) -> PathBuf {
        self.rag_path().join("profile_settings.json")
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DbConfig {
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/job_rag/store.sqlite"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub candidate_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            candidate_k: DEFAULT_CANDIDATE_K,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: Option<String>,
    pub dims: Option<usize>,
    /// Base URL for the Ollama provider.
    pub url: Option<String>,
    pub batch_size: usize,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            dims: None,
            url: None,
            batch_size: 64,
            max_retries: 5,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub url: String,
    pub temperature: f32,
    /// Per-call timeout applied to each of the four generation calls.
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3.2:3b".to_string(),
            url: "http://localhost:11434".to_string(),
            temperature: 0.3,
            timeout_secs: 120,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7341".to_string(),
        }
    }
}

impl Config {
    /// Apply `OLLAMA_HOST` / `LLM_MODEL` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.llm.provider == "ollama" {
            if let Some(host) = lookup("OLLAMA_HOST").filter(|v| !v.trim().is_empty()) {
                self.llm.url = host;
            }
        }
        if let Some(model) = lookup("LLM_MODEL").filter(|v| !v.trim().is_empty()) {
            self.llm.model = model;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            bail!("chunking.chunk_size must be > 0");
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            bail!("chunking.chunk_overlap must be smaller than chunking.chunk_size");
        }

        if self.retrieval.top_k == 0 {
            bail!("retrieval.top_k must be >= 1");
        }
        if self.retrieval.candidate_k < self.retrieval.top_k {
            bail!("retrieval.candidate_k must be >= retrieval.top_k");
        }

        match self.embedding.provider.as_str() {
            "disabled" | "ollama" | "openai" | "local" => {}
            other => bail!(
                "Unknown embedding provider: '{}'. Must be disabled, ollama, openai, or local.",
                other
            ),
        }
        if self.embedding.is_enabled() && self.embedding.provider != "local" {
            if self.embedding.dims.is_none() || self.embedding.dims == Some(0) {
                bail!(
                    "embedding.dims must be > 0 when provider is '{}'",
                    self.embedding.provider
                );
            }
            if self.embedding.model.is_none() {
                bail!(
                    "embedding.model must be specified when provider is '{}'",
                    self.embedding.provider
                );
            }
        }
        if self.embedding.batch_size == 0 {
            bail!("embedding.batch_size must be > 0");
        }

        match self.llm.provider.as_str() {
            "ollama" | "openai" => {}
            other => bail!(
                "Unknown llm provider: '{}'. Must be ollama or openai.",
                other
            ),
        }
        if self.llm.model.trim().is_empty() {
            bail!("llm.model must not be empty");
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            bail!("llm.temperature must be in [0.0, 2.0]");
        }
        if self.llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be > 0");
        }

        Ok(())
    }
}

fn finish(mut config: Config) -> Result<Config> {
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

/// Parse, apply environment overrides, and validate a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    finish(config)
}

/// Like [`load_config`], but a missing file at `path` yields the defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    warn!(path = %path.display(), "config file not found, using defaults");
    finish(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let c = parse("");
        c.validate().unwrap();
        assert_eq!(c.chunking.chunk_size, 800);
        assert_eq!(c.chunking.chunk_overlap, 200);
        assert_eq!(c.retrieval.top_k, 6);
        assert_eq!(c.retrieval.candidate_k, 24);
        assert_eq!(c.llm.model, "llama3.2:3b");
        assert_eq!(c.llm.temperature, 0.3);
        assert!(!c.embedding.is_enabled());
        assert_eq!(
            c.data.profile_docs_path(),
            PathBuf::from("data/job_rag/profile_docs")
        );
        assert_eq!(
            c.data.profile_file(),
            PathBuf::from("data/job_rag/profile_settings.json")
        );
        assert_eq!(c.data.outputs_path(), PathBuf::from("data/outputs"));
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let c = parse(
            r#"
            [llm]
            model = "qwen2.5:7b"

            [retrieval]
            top_k = 4
            "#,
        );
        assert_eq!(c.llm.model, "qwen2.5:7b");
        assert_eq!(c.llm.url, "http://localhost:11434");
        assert_eq!(c.retrieval.top_k, 4);
        assert_eq!(c.retrieval.candidate_k, 24);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("OLLAMA_HOST", "http://gpu-box:11434"),
            ("LLM_MODEL", "mistral"),
        ]
        .into_iter()
        .collect();
        let lookup = |k: &str| env.get(k).map(|v| v.to_string());

        let mut c = Config::default();
        c.apply_env(lookup);
        assert_eq!(c.llm.url, "http://gpu-box:11434");
        assert_eq!(c.llm.model, "mistral");

        let mut c = parse("[llm]\nprovider = \"openai\"\nurl = \"https://api.openai.com\"");
        c.apply_env(lookup);
        assert_eq!(c.llm.url, "https://api.openai.com");
        assert_eq!(c.llm.model, "mistral");
    }

    #[test]
    fn test_validation_failures() {
        let bad = [
            "[chunking]\nchunk_size = 100\nchunk_overlap = 100",
            "[retrieval]\ntop_k = 0",
            "[retrieval]\ntop_k = 10\ncandidate_k = 5",
            "[embedding]\nprovider = \"bert\"",
            "[embedding]\nprovider = \"openai\"\nmodel = \"text-embedding-3-small\"",
            "[llm]\nprovider = \"anthropic\"",
            "[llm]\ntemperature = 3.5",
        ];
        for src in bad {
            assert!(parse(src).validate().is_err(), "accepted: {}", src);
        }
    }

    #[test]
    fn test_local_embeddings_need_no_dims() {
        let c = parse("[embedding]\nprovider = \"local\"");
        c.validate().unwrap();
    }
}
