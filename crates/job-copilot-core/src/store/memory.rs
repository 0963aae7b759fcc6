//! In-memory [`Store`] implementation for tests and embedding-free runs.
//!
//! Uses `HashMap` and `Vec` behind `std::sync::RwLock`. Vector search is
//! brute-force cosine similarity; keyword search counts how many distinct
//! query terms each chunk contains and tops up with the newest chunks.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::{Chunk, Document, ScoredChunk};
use crate::text::tokenize_lower;

use super::{fill_with_recent, rank, Store, StoreStats};

struct StoredChunk {
    chunk: Chunk,
    vector: Option<Vec<f32>>,
}

/// In-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    docs: RwLock<HashMap<String, Document>>,
    chunks: RwLock<Vec<StoredChunk>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn scored(doc: &Document, chunk: &Chunk, score: f64) -> ScoredChunk {
    ScoredChunk {
        chunk_id: chunk.id.clone(),
        document_id: doc.id.clone(),
        source: doc.source.clone(),
        doc_type: doc.doc_type,
        text: chunk.text.clone(),
        score,
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn add_document(
        &self,
        doc: &Document,
        chunks: &[Chunk],
        vectors: Option<&[Vec<f32>]>,
    ) -> Result<()> {
        if let Some(vecs) = vectors {
            if vecs.len() != chunks.len() {
                bail!(
                    "got {} vectors for {} chunks of {}",
                    vecs.len(),
                    chunks.len(),
                    doc.source
                );
            }
        }

        write(&self.docs)?.insert(doc.id.clone(), doc.clone());
        let mut stored = write(&self.chunks)?;
        for (i, c) in chunks.iter().enumerate() {
            stored.push(StoredChunk {
                chunk: c.clone(),
                vector: vectors.map(|v| v[i].clone()),
            });
        }
        Ok(())
    }

    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<ScoredChunk>> {
        let terms: HashSet<String> = tokenize_lower(query).into_iter().collect();

        let docs = read(&self.docs)?;
        let chunks = read(&self.chunks)?;
        let hits = chunks
            .iter()
            .filter_map(|sc| {
                let doc = docs.get(&sc.chunk.document_id)?;
                let text_terms: HashSet<String> =
                    tokenize_lower(&sc.chunk.text).into_iter().collect();
                let matches = terms.intersection(&text_terms).count();
                (matches > 0).then(|| scored(doc, &sc.chunk, matches as f64))
            })
            .collect();
        let recent = chunks.iter().rev().filter_map(|sc| {
            let doc = docs.get(&sc.chunk.document_id)?;
            Some(scored(doc, &sc.chunk, 0.0))
        });
        Ok(fill_with_recent(rank(hits, limit), recent, limit))
    }

    async fn vector_search(&self, query_vec: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let docs = read(&self.docs)?;
        let chunks = read(&self.chunks)?;
        let hits = chunks
            .iter()
            .filter_map(|sc| {
                let vector = sc.vector.as_ref()?;
                let doc = docs.get(&sc.chunk.document_id)?;
                let sim = cosine_similarity(query_vec, vector) as f64;
                Some(scored(doc, &sc.chunk, sim))
            })
            .collect();
        Ok(rank(hits, limit))
    }

    async fn stats(&self) -> Result<StoreStats> {
        let documents = read(&self.docs)?.len() as u64;
        let chunks = read(&self.chunks)?;
        Ok(StoreStats {
            documents,
            chunks: chunks.len() as u64,
            vectors: chunks.iter().filter(|c| c.vector.is_some()).count() as u64,
        })
    }
}
