//! SQLite-backed [`Store`] implementation.
//!
//! Documents, chunks, an FTS5 index and optional embedding blobs live in
//! one database file (see [`crate::migrate`]). Keyword search goes through
//! FTS5 with BM25 ranking and is topped up with the most recently inserted
//! chunks; vector search is a brute-force cosine scan over `chunk_vectors`.

use std::collections::HashSet;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use job_copilot_core::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use job_copilot_core::models::{Chunk, DocType, Document, ScoredChunk};
use job_copilot_core::store::{fill_with_recent, rank, Store, StoreStats};
use job_copilot_core::text::tokenize_lower;

use crate::config::Config;
use crate::{db, migrate};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database and ensure the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Turn free text into an FTS5 query: each distinct term quoted, joined
/// with `OR`. Stop words and symbol-only tokens are dropped. Returns `None`
/// when nothing searchable remains.
pub fn fts_query(query: &str) -> Option<String> {
    let mut seen = HashSet::new();
    let quoted: Vec<String> = tokenize_lower(query)
        .into_iter()
        .filter(|t| t.chars().any(char::is_alphanumeric))
        .filter(|t| seen.insert(t.clone()))
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect();
    if quoted.is_empty() {
        None
    } else {
        Some(quoted.join(" OR "))
    }
}

fn row_doc_type(row: &SqliteRow) -> Result<DocType> {
    let raw: String = row.get("doc_type");
    DocType::parse(&raw).ok_or_else(|| anyhow!("unknown doc_type in store: {}", raw))
}

fn scored_row(row: &SqliteRow, score: f64) -> Result<ScoredChunk> {
    Ok(ScoredChunk {
        chunk_id: row.get("chunk_id"),
        document_id: row.get("document_id"),
        source: row.get("source"),
        doc_type: row_doc_type(row)?,
        text: row.get("text"),
        score,
    })
}

#[async_trait]
impl Store for SqliteStore {
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

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO documents (id, source, doc_type, title, created_at, body) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&doc.id)
        .bind(&doc.source)
        .bind(doc.doc_type.as_str())
        .bind(&doc.title)
        .bind(doc.created_at)
        .bind(&doc.body)
        .execute(&mut *tx)
        .await?;

        for (i, chunk) in chunks.iter().enumerate() {
            sqlx::query(
                "INSERT INTO chunks (id, document_id, chunk_index, text, hash) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&chunk.id)
            .bind(&chunk.document_id)
            .bind(chunk.chunk_index)
            .bind(&chunk.text)
            .bind(&chunk.hash)
            .execute(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO chunks_fts (chunk_id, document_id, text) VALUES (?, ?, ?)")
                .bind(&chunk.id)
                .bind(&chunk.document_id)
                .bind(&chunk.text)
                .execute(&mut *tx)
                .await?;

            if let Some(vec) = vectors.and_then(|v| v.get(i)) {
                sqlx::query(
                    "INSERT INTO chunk_vectors (chunk_id, document_id, embedding) VALUES (?, ?, ?)",
                )
                .bind(&chunk.id)
                .bind(&doc.id)
                .bind(vec_to_blob(vec))
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<ScoredChunk>> {
        let mut hits = Vec::new();
        if let Some(match_expr) = fts_query(query) {
            let rows = sqlx::query(
                r#"
                SELECT chunks_fts.chunk_id AS chunk_id,
                       chunks_fts.document_id AS document_id,
                       chunks_fts.rank AS rank,
                       c.text AS text,
                       d.source AS source,
                       d.doc_type AS doc_type
                FROM chunks_fts
                JOIN chunks c ON c.id = chunks_fts.chunk_id
                JOIN documents d ON d.id = chunks_fts.document_id
                WHERE chunks_fts MATCH ?
                ORDER BY chunks_fts.rank
                LIMIT ?
                "#,
            )
            .bind(&match_expr)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

            for row in &rows {
                let bm25: f64 = row.get("rank");
                hits.push(scored_row(row, -bm25)?);
            }
        }
        if hits.len() >= limit {
            return Ok(hits);
        }

        // Matched chunks can reappear among the newest rows.
        let rows = sqlx::query(
            r#"
            SELECT c.id AS chunk_id,
                   c.document_id AS document_id,
                   c.text AS text,
                   d.source AS source,
                   d.doc_type AS doc_type
            FROM chunks c
            JOIN documents d ON d.id = c.document_id
            ORDER BY c.rowid DESC
            LIMIT ?
            "#,
        )
        .bind((limit + hits.len()) as i64)
        .fetch_all(&self.pool)
        .await?;
        let recent = rows
            .iter()
            .map(|row| scored_row(row, 0.0))
            .collect::<Result<Vec<_>>>()?;
        Ok(fill_with_recent(hits, recent, limit))
    }

    async fn vector_search(&self, query_vec: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let rows = sqlx::query(
            r#"
            SELECT cv.chunk_id AS chunk_id,
                   cv.document_id AS document_id,
                   cv.embedding AS embedding,
                   c.text AS text,
                   d.source AS source,
                   d.doc_type AS doc_type
            FROM chunk_vectors cv
            JOIN chunks c ON c.id = cv.chunk_id
            JOIN documents d ON d.id = cv.document_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut hits = Vec::with_capacity(rows.len());
        for row in &rows {
            let blob: Vec<u8> = row.get("embedding");
            let similarity = cosine_similarity(query_vec, &blob_to_vec(&blob)) as f64;
            hits.push(scored_row(row, similarity)?);
        }
        Ok(rank(hits, limit))
    }

    async fn stats(&self) -> Result<StoreStats> {
        let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        let chunks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks")
            .fetch_one(&self.pool)
            .await?;
        let vectors: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunk_vectors")
            .fetch_one(&self.pool)
            .await?;
        Ok(StoreStats {
            documents: documents as u64,
            chunks: chunks as u64,
            vectors: vectors as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use job_copilot_core::chunk::chunk_text;
    use tempfile::TempDir;

    async fn temp_store() -> (TempDir, SqliteStore) {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.db.path = tmp.path().join("store.sqlite");
        let store = SqliteStore::open(&config).await.unwrap();
        (tmp, store)
    }

    fn doc(id: &str, doc_type: DocType, body: &str) -> Document {
        Document {
            id: id.to_string(),
            source: format!("{}.md", id),
            doc_type,
            title: None,
            created_at: 1_700_000_000,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_fts_query_quotes_terms() {
        assert_eq!(
            fts_query("Must-have: Python, python & AWS"),
            Some("\"must-have\" OR \"python\" OR \"aws\"".to_string())
        );
        assert_eq!(fts_query("the and of"), None);
        assert_eq!(fts_query(""), None);
    }

    #[tokio::test]
    async fn test_keyword_search_carries_metadata() {
        let (_tmp, store) = temp_store().await;
        let cv = doc("cv", DocType::Profile, "Reduced cloud costs by 30% with Terraform.");
        let jd = doc("jd", DocType::Jd, "Must have Terraform and Kubernetes.");
        for d in [&cv, &jd] {
            let chunks = chunk_text(&d.id, &d.body, 800, 200);
            store.add_document(d, &chunks, None).await.unwrap();
        }

        let hits = store.keyword_search("terraform", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        let jd_hit = hits.iter().find(|h| h.document_id == "jd").unwrap();
        assert_eq!(jd_hit.doc_type, DocType::Jd);
        assert_eq!(jd_hit.source, "jd.md");

        let hits = store.keyword_search("kubernetes", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_id, "jd");
        assert!(hits[0].score > 0.0);
    }

    #[tokio::test]
    async fn test_keyword_search_fills_with_newest_chunks() {
        let (_tmp, store) = temp_store().await;
        for (id, body) in [
            ("cv-old", "Led a team of five engineers."),
            ("cv-mid", "Built Python APIs on AWS."),
            ("cv-new", "Reduced cloud spend by 30%."),
        ] {
            let d = doc(id, DocType::Profile, body);
            let chunks = chunk_text(&d.id, &d.body, 800, 200);
            store.add_document(&d, &chunks, None).await.unwrap();
        }

        let hits = store.keyword_search("python", 2).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.document_id.as_str()).collect();
        assert_eq!(ids, vec!["cv-mid", "cv-new"]);
        assert!(hits[0].score > 0.0);
        assert_eq!(hits[1].score, 0.0);
        assert_eq!(hits[1].doc_type, DocType::Profile);

        let hits = store
            .keyword_search("List must-have requirements and responsibilities.", 10)
            .await
            .unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.document_id.as_str()).collect();
        assert_eq!(ids, vec!["cv-new", "cv-mid", "cv-old"]);

        assert_eq!(store.keyword_search("the", 10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_vector_search_and_stats() {
        let (_tmp, store) = temp_store().await;
        let d = doc("cv", DocType::Profile, "alpha\n\nbeta");
        let chunks = chunk_text(&d.id, &d.body, 6, 0);
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        store
            .add_document(&d, &chunks, Some(vectors.as_slice()))
            .await
            .unwrap();

        let hits = store.vector_search(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "beta");

        let stats = store.stats().await.unwrap();
        assert_eq!(
            stats,
            StoreStats {
                documents: 1,
                chunks: 2,
                vectors: 2
            }
        );
    }

    #[tokio::test]
    async fn test_reindexing_accumulates_duplicates() {
        let (_tmp, store) = temp_store().await;
        for id in ["jd-a", "jd-b"] {
            let d = doc(id, DocType::Jd, "Same description.");
            let chunks = chunk_text(&d.id, &d.body, 800, 200);
            store.add_document(&d, &chunks, None).await.unwrap();
        }
        assert_eq!(store.stats().await.unwrap().chunks, 2);
        assert_eq!(store.keyword_search("description", 10).await.unwrap().len(), 2);
    }
}
