//! Storage abstraction for indexed profile and job-description text.
//!
//! The [`Store`] trait covers what retrieval needs: adding a chunked
//! document (optionally with one embedding per chunk), keyword search,
//! vector search, and counts. Results carry the source path and
//! [`DocType`](crate::models::DocType) so callers can filter partitions.
//!
//! Implementations must be `Send + Sync`; the orchestrator holds them as
//! `Arc<dyn Store>`.

pub mod memory;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{Chunk, Document, ScoredChunk};

/// Row counts for `jcp index` and `/health`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub documents: u64,
    pub chunks: u64,
    pub vectors: u64,
}

/// Abstract document store.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`add_document`](Store::add_document) | Insert a document with its chunks and optional vectors |
/// | [`keyword_search`](Store::keyword_search) | Term-match search over chunk text, topped up with recent chunks |
/// | [`vector_search`](Store::vector_search) | Cosine similarity search over stored vectors |
/// | [`stats`](Store::stats) | Row counts |
///
/// Adding the same text twice stores it twice; the store never
/// deduplicates.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a document and its chunks. When `vectors` is given it must
    /// hold one vector per chunk, in chunk order.
    async fn add_document(
        &self,
        doc: &Document,
        chunks: &[Chunk],
        vectors: Option<&[Vec<f32>]>,
    ) -> Result<()>;

    /// Return `limit` chunks (fewer only when the store holds fewer):
    /// those matching any query term first, best first, then the rest
    /// newest first with a score of `0.0`.
    ///
    /// The fill keeps keyword retrieval on par with vector search, which
    /// always returns its nearest `limit` chunks whatever the wording.
    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<ScoredChunk>>;

    /// Return up to `limit` chunks closest to `query_vec`, best first.
    async fn vector_search(&self, query_vec: &[f32], limit: usize) -> Result<Vec<ScoredChunk>>;

    async fn stats(&self) -> Result<StoreStats>;
}

/// Append `recent` chunks not already in `hits` until `limit` is reached.
pub fn fill_with_recent(
    mut hits: Vec<ScoredChunk>,
    recent: impl IntoIterator<Item = ScoredChunk>,
    limit: usize,
) -> Vec<ScoredChunk> {
    let mut seen: HashSet<String> = hits.iter().map(|h| h.chunk_id.clone()).collect();
    for chunk in recent {
        if hits.len() >= limit {
            break;
        }
        if seen.insert(chunk.chunk_id.clone()) {
            hits.push(ScoredChunk { score: 0.0, ..chunk });
        }
    }
    hits
}

/// Sort by descending score and keep the first `limit`.
pub fn rank(mut hits: Vec<ScoredChunk>, limit: usize) -> Vec<ScoredChunk> {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocType;

    fn hit(id: &str, score: f64) -> ScoredChunk {
        ScoredChunk {
            chunk_id: id.to_string(),
            document_id: "d".to_string(),
            source: "d.md".to_string(),
            doc_type: DocType::Profile,
            text: id.to_string(),
            score,
        }
    }

    #[test]
    fn test_fill_skips_duplicates_and_stops_at_limit() {
        let hits = vec![hit("a", 3.0)];
        let recent = vec![hit("c", 9.0), hit("a", 9.0), hit("b", 9.0), hit("z", 9.0)];
        let filled = fill_with_recent(hits, recent, 3);
        let ids: Vec<&str> = filled.iter().map(|h| h.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
        assert_eq!(filled[0].score, 3.0);
        assert!(filled[1..].iter().all(|h| h.score == 0.0));
    }

    #[test]
    fn test_fill_leaves_full_hits_alone() {
        let hits = vec![hit("a", 2.0), hit("b", 1.0)];
        let filled = fill_with_recent(hits, vec![hit("c", 0.0)], 2);
        assert_eq!(filled.len(), 2);
        assert_eq!(filled[1].chunk_id, "b");
    }
}
