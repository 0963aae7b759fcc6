//! Text normalization, tokenization, and term ranking.
//!
//! These are the leaf helpers of the skill matcher. Everything here is
//! deterministic: the same input always yields the same tokens in the same
//! order, which is what makes extraction idempotent.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Static English stop-word set. No external NLP data is needed.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "while", "is", "are", "was", "were", "be", "been",
    "being", "to", "of", "in", "on", "for", "with", "as", "by", "that", "this", "it", "its", "at",
    "from", "into", "about", "up", "down", "over", "under", "again", "further", "then", "once",
    "here", "there", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such",
    "no", "nor", "not", "only", "own", "same", "so", "than", "too", "very",
];

static LINE_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9\-+&/]+").unwrap());
static CAPITALIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-zA-Z0-9\-+&/]{1,}\b").unwrap());

/// Collapse line breaks and whitespace runs into single spaces and trim.
pub fn normalize_text(text: &str) -> String {
    let text = LINE_BREAKS.replace_all(text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Split text into runs of alphanumerics plus `-`, `+`, `&`, `/`.
pub fn simple_tokenize(text: &str) -> Vec<&str> {
    TOKEN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Lowercased tokens with stop words and pure-digit tokens removed.
pub fn tokenize_lower(text: &str) -> Vec<String> {
    simple_tokenize(text)
        .into_iter()
        .map(str::to_lowercase)
        .filter(|t| !t.is_empty())
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .collect()
}

/// Rank tokens by frequency and return the `topn` most frequent ones whose
/// length is at least `min_len` characters.
///
/// Tokens with equal counts keep the order in which they first appeared.
pub fn top_terms(tokens: &[String], topn: usize, min_len: usize) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (pos, tok) in tokens.iter().enumerate() {
        if tok.chars().count() < min_len {
            continue;
        }
        counts.entry(tok.as_str()).or_insert((0, pos)).0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(tok, (count, first))| (tok, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(topn)
        .map(|(tok, _, _)| tok.to_string())
        .collect()
}

/// Distinct capitalized words in the original (non-lowercased) text, sorted.
///
/// Used to recover proper-noun skills that the frequency pass misses.
pub fn capitalized_terms(text: &str) -> Vec<String> {
    let mut caps: Vec<String> = CAPITALIZED
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    caps.sort();
    caps.dedup();
    caps
}

/// Render items as a `- item` bullet list, one per line.
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|x| format!("- {}", x.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
