//! Fuzzy string similarity and best-match lookup.
//!
//! All three fuzzy passes of the pipeline (hard/soft skill extraction, the
//! capitalized-word recovery pass, and profile alignment) go through
//! [`best_match`], parameterized by a [`Scorer`]. The default scorer is
//! [`weighted_ratio`], a weighted combination of plain, partial, and
//! token-based ratios on a `0..=100` scale.
//!
//! Scoring is case-sensitive. Callers that want case-insensitive matching
//! lowercase both sides first (see the capitalized-word pass in
//! [`crate::matcher`]).
//!
//! # Weighted Ratio
//!
//! ```text
//! len_ratio = max(len) / min(len)
//! if len_ratio < 1.5:
//!     score = max(ratio, 0.95 × token_ratio)
//! else:
//!     scale = 0.9 if len_ratio < 8 else 0.6
//!     score = max(ratio, scale × partial_ratio, 0.95 × scale × partial_token_ratio)
//! ```
//!
//! The base `ratio` is Indel similarity: only insertions and deletions
//! count, so `ratio = 2 × lcs / (len_a + len_b)`. A dropped plural `s`
//! costs one edit out of both lengths combined, which keeps inflected
//! forms such as `communications` and `transformer` above the cutoffs.

use std::collections::BTreeSet;

/// A pluggable string-similarity function returning a score in `0..=100`.
pub type Scorer = fn(&str, &str) -> f64;

const UNBASE_SCALE: f64 = 0.95;

/// Length of the longest common subsequence, by characters.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row[b.len()]
}

/// Indel similarity scaled to `0..=100`. Two empty strings score 100.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(&a, &b) as f64 / total as f64
}

/// Best [`ratio`] of the shorter string against every equally long window
/// of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let short_len = short.chars().count();
    if short_len == 0 {
        return 0.0;
    }
    let long_chars: Vec<char> = long.chars().collect();
    if short_len == long_chars.len() {
        return ratio(short, long);
    }

    let mut best = 0.0f64;
    for window in long_chars.windows(short_len) {
        let candidate: String = window.iter().collect();
        let score = ratio(short, &candidate);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// [`ratio`] after sorting whitespace-separated tokens.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Token-set similarity: compares the shared tokens against each side's
/// remainder. Returns 100 when one token set contains the other.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let sect: Vec<&str> = ta.intersection(&tb).copied().collect();
    let diff_ab: Vec<&str> = ta.difference(&tb).copied().collect();
    let diff_ba: Vec<&str> = tb.difference(&ta).copied().collect();

    if !sect.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return 100.0;
    }

    let sect = sect.join(" ");
    let join = |diff: &[&str]| {
        if sect.is_empty() {
            diff.join(" ")
        } else {
            format!("{} {}", sect, diff.join(" "))
        }
    };
    let combined_ab = join(&diff_ab);
    let combined_ba = join(&diff_ba);

    let mut best = ratio(&combined_ab, &combined_ba);
    if !sect.is_empty() {
        best = best
            .max(ratio(&sect, &combined_ab))
            .max(ratio(&sect, &combined_ba));
    }
    best
}

/// Partial ratio over sorted unique tokens; 100 when any token is shared.
pub fn partial_token_ratio(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    if ta.intersection(&tb).next().is_some() {
        return 100.0;
    }
    let joined_a = ta.into_iter().collect::<Vec<_>>().join(" ");
    let joined_b = tb.into_iter().collect::<Vec<_>>().join(" ");
    partial_ratio(&joined_a, &joined_b)
}

/// Weighted combination of the ratios above. See the module docs.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;
    let end_ratio = ratio(a, b);

    if len_ratio < 1.5 {
        let token_ratio = token_sort_ratio(a, b).max(token_set_ratio(a, b));
        return end_ratio.max(token_ratio * UNBASE_SCALE);
    }

    let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
    end_ratio
        .max(partial_ratio(a, b) * partial_scale)
        .max(partial_token_ratio(a, b) * UNBASE_SCALE * partial_scale)
}

/// Find the best-scoring term for `candidate`, if it reaches `cutoff`.
///
/// Ties resolve to the first term (in slice order) that reached the top
/// score. Returns the matched term and its score.
pub fn best_match<'a, S: AsRef<str>>(
    candidate: &str,
    terms: &'a [S],
    cutoff: f64,
    scorer: Scorer,
) -> Option<(&'a str, f64)> {
    let mut best: Option<(&'a str, f64)> = None;
    for term in terms {
        let term = term.as_ref();
        let score = scorer(candidate, term);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((term, score)),
        }
    }
    best.filter(|(_, score)| *score >= cutoff)
}
