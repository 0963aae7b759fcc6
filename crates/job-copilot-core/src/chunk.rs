//! Recursive character chunker with overlap.
//!
//! Splits document text into [`Chunk`]s of at most `chunk_size` characters,
//! where consecutive chunks share up to `overlap` characters of trailing
//! context. Splitting prefers the coarsest separator that occurs in the
//! text: paragraph breaks, then line breaks, then spaces, then individual
//! characters as a last resort.
//!
//! Each chunk receives a random UUID plus a SHA-256 hash of its text.
//!
//! # Algorithm
//!
//! 1. Pick the first separator from `["\n\n", "\n", " ", ""]` present in the
//!    text and split on it.
//! 2. Pieces shorter than `chunk_size` are kept; longer pieces are split
//!    again with the remaining, finer separators.
//! 3. Adjacent pieces are merged back (joined by their separator) while the
//!    result stays within `chunk_size`. When a chunk is flushed, trailing
//!    pieces totalling at most `overlap` characters seed the next one.
//! 4. Chunks are trimmed; whitespace-only chunks are dropped.
//!
//! ```rust
//! use job_copilot_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("doc-123", "Hello world.\n\nSecond paragraph.", 800, 200);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].chunk_index, 0);
//! ```

use std::collections::VecDeque;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::Chunk;

pub const DEFAULT_CHUNK_SIZE: usize = 800;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// Returns chunks with contiguous indices starting at 0. Empty or
/// whitespace-only text yields no chunks. `overlap` is clamped below
/// `chunk_size`.
pub fn chunk_text(document_id: &str, text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size.saturating_sub(1));

    split_recursive(text, &SEPARATORS, chunk_size, overlap)
        .into_iter()
        .enumerate()
        .map(|(i, piece)| make_chunk(document_id, i as i64, &piece))
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_recursive(text: &str, separators: &[&str], size: usize, overlap: usize) -> Vec<String> {
    let (idx, separator) = separators
        .iter()
        .enumerate()
        .find(|(_, sep)| sep.is_empty() || text.contains(**sep))
        .map(|(i, sep)| (i, *sep))
        .unwrap_or((separators.len().saturating_sub(1), ""));
    let finer = &separators[(idx + 1).min(separators.len())..];

    let splits: Vec<String> = if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    };

    let mut out = Vec::new();
    let mut good: Vec<String> = Vec::new();
    for piece in splits {
        if char_len(&piece) < size {
            good.push(piece);
            continue;
        }
        if !good.is_empty() {
            out.extend(merge_splits(&good, separator, size, overlap));
            good.clear();
        }
        if finer.is_empty() {
            out.push(piece);
        } else {
            out.extend(split_recursive(&piece, finer, size, overlap));
        }
    }
    if !good.is_empty() {
        out.extend(merge_splits(&good, separator, size, overlap));
    }
    out
}

fn merge_splits(splits: &[String], separator: &str, size: usize, overlap: usize) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut docs = Vec::new();
    let mut current: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    let joiner = |current: &VecDeque<&str>| if current.is_empty() { 0 } else { sep_len };

    for piece in splits {
        let len = char_len(piece);
        if total + len + joiner(&current) > size && !current.is_empty() {
            push_joined(&mut docs, &current, separator);
            while total > overlap || (total > 0 && total + len + joiner(&current) > size) {
                let Some(front) = current.pop_front() else {
                    break;
                };
                total -= char_len(front) + joiner(&current);
            }
        }
        total += len + joiner(&current);
        current.push_back(piece.as_str());
    }
    push_joined(&mut docs, &current, separator);
    docs
}

fn push_joined(docs: &mut Vec<String>, parts: &VecDeque<&str>, separator: &str) {
    let joined = parts.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

/// Create a single [`Chunk`] with a UUID and SHA-256 content hash.
fn make_chunk(document_id: &str, index: i64, text: &str) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id: Uuid::new_v4().to_string(),
        document_id: document_id.to_string(),
        chunk_index: index,
        text: text.to_string(),
        hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = chunk_text("doc1", "Hello, world!", 800, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_index, 0);
        assert_eq!(chunks[0].text, "Hello, world!");
        assert_eq!(chunks[0].document_id, "doc1");
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        assert!(chunk_text("doc1", "", 800, 200).is_empty());
        assert!(chunk_text("doc1", "  \n\n \n", 800, 200).is_empty());
    }

    #[test]
    fn test_chunks_respect_size() {
        let text = (0..200)
            .map(|i| format!("Bullet number {} shipped a measurable result.", i))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = chunk_text("doc1", &text, 120, 30);
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert!(c.text.chars().count() <= 120, "chunk {} too long", i);
            assert_eq!(c.chunk_index, i as i64);
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let text = (0..40)
            .map(|i| format!("line{:02}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = chunk_text("doc1", &text, 50, 20);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let last_line = pair[0].text.lines().last().unwrap();
            assert!(
                pair[1].text.starts_with(last_line) || pair[1].text.contains(last_line),
                "expected {:?} to carry {:?}",
                pair[1].text,
                last_line
            );
        }
    }

    #[test]
    fn test_zero_overlap_has_no_repeats() {
        let text = (0..40)
            .map(|i| format!("line{:02}", i))
            .collect::<Vec<_>>()
            .join("\n");
        let chunks = chunk_text("doc1", &text, 50, 0);
        let total: usize = chunks.iter().map(|c| c.text.lines().count()).sum();
        assert_eq!(total, 40);
    }

    #[test]
    fn test_unbroken_text_falls_back_to_chars() {
        let text = "x".repeat(250);
        let chunks = chunk_text("doc1", &text, 100, 0);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text.len(), 100);
        assert_eq!(chunks[2].text.len(), 50);
    }

    #[test]
    fn test_multibyte_utf8_chars() {
        let text = "┌──────────────────┐\n│ Hello world      │\n└──────────────────┘";
        let chunks = chunk_text("doc1", text, 12, 4);
        assert!(!chunks.is_empty());
        for c in &chunks {
            assert!(c.text.chars().count() <= 12);
        }
    }

    #[test]
    fn test_hash_is_deterministic() {
        let text = "Alpha\n\nBeta\n\nGamma\n\nDelta";
        let c1 = chunk_text("doc1", text, 12, 0);
        let c2 = chunk_text("doc1", text, 12, 0);
        assert_eq!(c1.len(), c2.len());
        for (a, b) in c1.iter().zip(c2.iter()) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.hash, b.hash);
            assert_ne!(a.id, b.id);
        }
    }
}
