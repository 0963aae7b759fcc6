//! Indexing of profile documents and job descriptions.
//!
//! Flow per document: read → extract text → chunk → embed (when an
//! embedder is configured) → [`Store::add_document`]. Every call adds new
//! rows; re-indexing the same file produces duplicate chunks, which
//! retrieval tolerates.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use job_copilot_core::chunk::chunk_text;
use job_copilot_core::embedding::Embedder;
use job_copilot_core::models::{DocType, Document};
use job_copilot_core::store::Store;

use crate::config::ChunkingConfig;
use crate::extract::{extract_file, SUPPORTED_EXTENSIONS};

/// File name the job description is written to inside the RAG directory.
pub const JD_FILE_NAME: &str = "jd.txt";

/// A profile document read from disk.
#[derive(Debug, Clone)]
pub struct LoadedDoc {
    pub path: PathBuf,
    pub text: String,
}

/// Counts from one indexing call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub documents: usize,
    pub chunks: usize,
    pub vectors: usize,
    pub skipped: usize,
}

impl IndexReport {
    fn absorb(&mut self, other: IndexReport) {
        self.documents += other.documents;
        self.chunks += other.chunks;
        self.vectors += other.vectors;
        self.skipped += other.skipped;
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Read every supported document under `dir`, sorted by path.
///
/// A missing directory yields no documents. Files that fail extraction or
/// contain only whitespace are skipped with a warning; the second element
/// of the result counts them.
pub fn load_profile_docs(dir: &Path) -> Result<(Vec<LoadedDoc>, usize)> {
    if !dir.exists() {
        debug!(dir = %dir.display(), "profile docs directory missing");
        return Ok((Vec::new(), 0));
    }

    let patterns: Vec<String> = SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!("**/*.{}", ext))
        .collect();
    let include = build_globset(&patterns)?;
    let exclude = build_globset(&["**/.*".to_string(), "**/.*/**".to_string()])?;

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_lowercase();
        if exclude.is_match(&rel_str) || !include.is_match(&rel_str) {
            continue;
        }
        paths.push(path.to_path_buf());
    }
    paths.sort();

    let mut docs = Vec::with_capacity(paths.len());
    let mut skipped = 0;
    for path in paths {
        match extract_file(&path) {
            Ok(text) if !text.trim().is_empty() => docs.push(LoadedDoc { path, text }),
            Ok(_) => {
                warn!(path = %path.display(), "profile document has no text, skipping");
                skipped += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to extract profile document, skipping");
                skipped += 1;
            }
        }
    }
    Ok((docs, skipped))
}

/// Writes documents into a [`Store`], embedding chunks when possible.
#[derive(Clone)]
pub struct Indexer {
    store: Arc<dyn Store>,
    embedder: Option<Arc<dyn Embedder>>,
    chunking: ChunkingConfig,
}

impl Indexer {
    pub fn new(
        store: Arc<dyn Store>,
        embedder: Option<Arc<dyn Embedder>>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            chunking,
        }
    }

    /// Chunk, embed and store one document.
    pub async fn index_text(
        &self,
        source: &str,
        title: Option<String>,
        doc_type: DocType,
        text: &str,
    ) -> Result<IndexReport> {
        let doc = Document {
            id: Uuid::new_v4().to_string(),
            source: source.to_string(),
            doc_type,
            title,
            created_at: chrono::Utc::now().timestamp(),
            body: text.to_string(),
        };
        let chunks = chunk_text(
            &doc.id,
            text,
            self.chunking.chunk_size,
            self.chunking.chunk_overlap,
        );

        let vectors = match &self.embedder {
            Some(embedder) if !chunks.is_empty() => {
                let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
                let vectors = embedder
                    .embed(&texts)
                    .await
                    .with_context(|| format!("Failed to embed {}", source))?;
                Some(vectors)
            }
            _ => None,
        };

        self.store
            .add_document(&doc, &chunks, vectors.as_deref())
            .await?;

        debug!(source, doc_type = %doc_type, chunks = chunks.len(), "indexed document");
        Ok(IndexReport {
            documents: 1,
            chunks: chunks.len(),
            vectors: vectors.map_or(0, |v| v.len()),
            skipped: 0,
        })
    }

    /// Index every supported file under `dir` as a profile document.
    pub async fn index_profile_docs(&self, dir: &Path) -> Result<IndexReport> {
        let (docs, skipped) = load_profile_docs(dir)?;
        let mut report = IndexReport {
            skipped,
            ..IndexReport::default()
        };
        for doc in &docs {
            let title = doc
                .path
                .file_name()
                .map(|n| n.to_string_lossy().to_string());
            let source = doc.path.display().to_string();
            report.absorb(
                self.index_text(&source, title, DocType::Profile, &doc.text)
                    .await?,
            );
        }
        info!(
            dir = %dir.display(),
            documents = report.documents,
            chunks = report.chunks,
            skipped = report.skipped,
            "indexed profile documents"
        );
        Ok(report)
    }

    /// Write `jd_text` to `<rag_dir>/jd.txt` and index it as a job
    /// description.
    pub async fn index_jd_text(&self, rag_dir: &Path, jd_text: &str) -> Result<IndexReport> {
        std::fs::create_dir_all(rag_dir)
            .with_context(|| format!("Failed to create {}", rag_dir.display()))?;
        let jd_path = rag_dir.join(JD_FILE_NAME);
        std::fs::write(&jd_path, jd_text)
            .with_context(|| format!("Failed to write {}", jd_path.display()))?;

        let source = jd_path.display().to_string();
        let report = self
            .index_text(&source, Some(JD_FILE_NAME.to_string()), DocType::Jd, jd_text)
            .await?;
        info!(chunks = report.chunks, "indexed job description");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use job_copilot_core::store::memory::InMemoryStore;
    use tempfile::TempDir;

    fn indexer(store: Arc<InMemoryStore>) -> Indexer {
        Indexer::new(store, None, ChunkingConfig::default())
    }

    #[test]
    fn test_load_profile_docs_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::create_dir_all(dir.join(".cache")).unwrap();
        std::fs::write(dir.join("b_cv.md"), "Python and Docker").unwrap();
        std::fs::write(dir.join("nested").join("a_notes.TXT"), "Led a team").unwrap();
        std::fs::write(dir.join("photo.png"), [0u8; 4]).unwrap();
        std::fs::write(dir.join("empty.txt"), "   \n").unwrap();
        std::fs::write(dir.join(".cache").join("tmp.md"), "hidden").unwrap();

        let (docs, skipped) = load_profile_docs(dir).unwrap();
        let names: Vec<String> = docs
            .iter()
            .map(|d| d.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["b_cv.md", "a_notes.TXT"]);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let (docs, skipped) = load_profile_docs(&tmp.path().join("nope")).unwrap();
        assert!(docs.is_empty());
        assert_eq!(skipped, 0);
    }

    #[tokio::test]
    async fn test_index_jd_text_writes_file_and_tags_jd() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(InMemoryStore::new());
        let idx = indexer(store.clone());

        let report = idx
            .index_jd_text(tmp.path(), "Must have Kubernetes experience.")
            .await
            .unwrap();
        assert_eq!(report.documents, 1);
        assert_eq!(report.chunks, 1);
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(JD_FILE_NAME)).unwrap(),
            "Must have Kubernetes experience."
        );

        let hits = store.keyword_search("kubernetes", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_type, DocType::Jd);
    }

    #[tokio::test]
    async fn test_index_profile_docs_counts() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("cv.md"), "Reduced latency by 40%.").unwrap();
        std::fs::write(tmp.path().join("summary.txt"), "Mentored five engineers.").unwrap();
        let store = Arc::new(InMemoryStore::new());

        let report = indexer(store.clone())
            .index_profile_docs(tmp.path())
            .await
            .unwrap();
        assert_eq!(report.documents, 2);
        assert_eq!(report.chunks, 2);
        assert_eq!(report.vectors, 0);
        assert_eq!(store.stats().await.unwrap().documents, 2);
    }
}
