//! Snippet retrieval over the document store.
//!
//! A retrieval fetches a fixed candidate pool (24 by default), filters it
//! by [`DocType`], and keeps the first `top_k` (6 by default). Filtering
//! after the fetch means a partition crowded out of the pool returns fewer
//! than `top_k` snippets, possibly none.
//!
//! With an [`Embedder`] configured the pool comes from vector search;
//! without one it comes from keyword search, which tops the pool up with
//! the newest chunks when too few contain a query term. Either way a
//! store holding at least `candidate_k` chunks yields a full pool.

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::embedding::{embed_query, Embedder};
use crate::models::{DocType, ScoredChunk};
use crate::store::Store;

pub const DEFAULT_TOP_K: usize = 6;
pub const DEFAULT_CANDIDATE_K: usize = 24;

/// Query used to pull requirement snippets out of the job description.
pub const JD_FOCUS_QUERY: &str = "List must-have requirements and responsibilities.";
/// Query used to pull evidence snippets out of the profile documents.
pub const PROFILE_FOCUS_QUERY: &str = "Find bullets that prove impact, results, metrics.";

#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn Store>,
    embedder: Option<Arc<dyn Embedder>>,
    top_k: usize,
    candidate_k: usize,
}

impl Retriever {
    pub fn new(store: Arc<dyn Store>, embedder: Option<Arc<dyn Embedder>>) -> Self {
        Self {
            store,
            embedder,
            top_k: DEFAULT_TOP_K,
            candidate_k: DEFAULT_CANDIDATE_K,
        }
    }

    /// Override the result and candidate pool sizes. The pool is never
    /// smaller than `top_k`.
    pub fn with_limits(mut self, top_k: usize, candidate_k: usize) -> Self {
        self.top_k = top_k;
        self.candidate_k = candidate_k.max(top_k);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn is_semantic(&self) -> bool {
        self.embedder.is_some()
    }

    /// Retrieve up to `top_k` chunks for `query`, optionally restricted to
    /// one document type.
    pub async fn retrieve(
        &self,
        query: &str,
        doc_type: Option<DocType>,
    ) -> Result<Vec<ScoredChunk>> {
        let pool = match &self.embedder {
            Some(embedder) => {
                let query_vec = embed_query(embedder.as_ref(), query).await?;
                self.store.vector_search(&query_vec, self.candidate_k).await?
            }
            None => self.store.keyword_search(query, self.candidate_k).await?,
        };
        let pool_len = pool.len();

        let hits: Vec<ScoredChunk> = pool
            .into_iter()
            .filter(|c| doc_type.map_or(true, |t| c.doc_type == t))
            .take(self.top_k)
            .collect();

        debug!(
            query,
            doc_type = doc_type.map(|t| t.as_str()).unwrap_or("any"),
            pool = pool_len,
            kept = hits.len(),
            "retrieved snippets"
        );
        Ok(hits)
    }
}

/// Numbered snippet list for the context block: `[1] text`, blank line
/// between entries. Empty input yields an empty string.
pub fn format_snippets(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, c)| format!("[{}] {}", i + 1, c.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Numbered list of snippet sources, one per line.
pub fn cite_sources(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, c)| format!("[{}] {}", i + 1, c.source))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::chunk_text;
    use crate::models::Document;
    use crate::store::memory::InMemoryStore;
    use async_trait::async_trait;

    async fn add(store: &InMemoryStore, id: &str, doc_type: DocType, body: &str) {
        let doc = Document {
            id: id.to_string(),
            source: format!("{}.md", id),
            doc_type,
            title: None,
            created_at: 0,
            body: body.to_string(),
        };
        let chunks = chunk_text(&doc.id, body, 800, 200);
        store.add_document(&doc, &chunks, None).await.unwrap();
    }

    fn chunk(source: &str, text: &str) -> ScoredChunk {
        ScoredChunk {
            chunk_id: "c".into(),
            document_id: "d".into(),
            source: source.into(),
            doc_type: DocType::Profile,
            text: text.into(),
            score: 1.0,
        }
    }

    #[tokio::test]
    async fn test_filters_by_doc_type() {
        let store = Arc::new(InMemoryStore::new());
        add(
            &store,
            "cv",
            DocType::Profile,
            "Delivered results and impact metrics.",
        )
        .await;
        add(&store, "jd", DocType::Jd, "Results matter here.").await;

        let retriever = Retriever::new(store, None);
        let profile = retriever
            .retrieve("results impact", Some(DocType::Profile))
            .await
            .unwrap();
        assert_eq!(profile.len(), 1);
        assert_eq!(profile[0].source, "cv.md");

        let jd = retriever
            .retrieve("results impact", Some(DocType::Jd))
            .await
            .unwrap();
        assert_eq!(jd.len(), 1);
        assert_eq!(jd[0].source, "jd.md");

        let any = retriever.retrieve("results impact", None).await.unwrap();
        assert_eq!(any.len(), 2);
    }

    #[tokio::test]
    async fn test_keyword_mode_returns_snippets_without_shared_terms() {
        let store = Arc::new(InMemoryStore::new());
        add(&store, "cv", DocType::Profile, "Built Python APIs on AWS.").await;
        add(&store, "jd", DocType::Jd, "We are hiring a backend engineer.").await;

        let retriever = Retriever::new(store, None);
        let jd = retriever
            .retrieve(JD_FOCUS_QUERY, Some(DocType::Jd))
            .await
            .unwrap();
        assert_eq!(jd.len(), 1);
        assert_eq!(jd[0].source, "jd.md");
        let profile = retriever
            .retrieve(PROFILE_FOCUS_QUERY, Some(DocType::Profile))
            .await
            .unwrap();
        assert_eq!(profile.len(), 1);
        assert_eq!(profile[0].source, "cv.md");
    }

    #[tokio::test]
    async fn test_crowded_partition_is_starved() {
        let store = Arc::new(InMemoryStore::new());
        for i in 0..5 {
            let id = format!("cv{}", i);
            add(&store, &id, DocType::Profile, "python python results").await;
        }
        add(&store, "jd", DocType::Jd, "python").await;

        let retriever = Retriever::new(store, None).with_limits(2, 3);
        let jd = retriever
            .retrieve("python results", Some(DocType::Jd))
            .await
            .unwrap();
        assert!(jd.is_empty());
        let profile = retriever
            .retrieve("python results", Some(DocType::Profile))
            .await
            .unwrap();
        assert_eq!(profile.len(), 2);
    }

    struct Axis;

    #[async_trait]
    impl Embedder for Axis {
        fn model_name(&self) -> &str {
            "axis"
        }
        fn dims(&self) -> usize {
            2
        }
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("metrics") {
                        vec![1.0, 0.0]
                    } else {
                        vec![0.0, 1.0]
                    }
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_semantic_mode_uses_vectors() {
        let store = Arc::new(InMemoryStore::new());
        let doc = Document {
            id: "cv".into(),
            source: "cv.md".into(),
            doc_type: DocType::Profile,
            title: None,
            created_at: 0,
            body: "Cut latency by 40%\n\nLikes hiking".into(),
        };
        let chunks = chunk_text(&doc.id, &doc.body, 20, 0);
        let vectors = vec![vec![0.9, 0.1], vec![0.0, 1.0]];
        store
            .add_document(&doc, &chunks, Some(vectors.as_slice()))
            .await
            .unwrap();

        let embedder: Arc<dyn Embedder> = Arc::new(Axis);
        let retriever = Retriever::new(store, Some(embedder)).with_limits(1, 24);
        assert!(retriever.is_semantic());
        let hits = retriever
            .retrieve(PROFILE_FOCUS_QUERY, Some(DocType::Profile))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "Cut latency by 40%");
    }

    #[test]
    fn test_format_snippets_numbers_from_one() {
        let s = format_snippets(&[chunk("a.md", "first"), chunk("b.md", "second")]);
        assert_eq!(s, "[1] first\n\n[2] second");
        assert_eq!(format_snippets(&[]), "");
    }

    #[test]
    fn test_cite_sources() {
        let s = cite_sources(&[chunk("a.md", "x"), chunk("b.pdf", "y")]);
        assert_eq!(s, "[1] a.md\n[2] b.pdf");
    }
}
