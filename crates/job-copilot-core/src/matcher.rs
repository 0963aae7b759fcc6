//! Lexicon-based skill extraction from free-text job descriptions.
//!
//! # Algorithm
//!
//! 1. Normalize whitespace and tokenize into lowercase terms, dropping stop
//!    words and pure digits.
//! 2. Rank terms by frequency and keep the top 80 of length ≥ 2.
//! 3. Fuzzy-match each candidate against the hard and soft lexicons
//!    (cutoff 86). A candidate claims at most one entry per lexicon.
//! 4. Scan the original text for capitalized words and match them,
//!    lowercased, against the lowercased hard lexicon (cutoff 90). This
//!    recovers proper-noun skills such as `AWS` that the case-sensitive
//!    frequency pass cannot score highly.
//! 5. Union both hard passes in canonical casing; sort and deduplicate.
//! 6. Remaining candidates of length ≥ 3 become keywords, in rank order.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::fuzzy::{best_match, weighted_ratio, Scorer};
use crate::lexicon::{HARD_SKILLS, SOFT_SKILLS};
use crate::text::{capitalized_terms, normalize_text, tokenize_lower, top_terms};

/// Number of ranked candidates considered.
pub const CANDIDATE_TOPN: usize = 80;
/// Minimum candidate length in characters.
pub const CANDIDATE_MIN_LEN: usize = 2;
/// Minimum keyword length in characters.
pub const KEYWORD_MIN_LEN: usize = 3;
/// Cutoff for the frequency pass.
pub const EXTRACT_CUTOFF: f64 = 86.0;
/// Cutoff for the capitalized-word pass.
pub const PROPER_NOUN_CUTOFF: f64 = 90.0;

/// Skills and keywords extracted from one job description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillExtraction {
    /// Hard skills in canonical lexicon casing, sorted.
    pub hard: Vec<String>,
    /// Soft skills in canonical lexicon casing, sorted.
    pub soft: Vec<String>,
    /// Frequent terms not classified as hard or soft, in rank order.
    pub keywords: Vec<String>,
}

impl SkillExtraction {
    pub fn is_empty(&self) -> bool {
        self.hard.is_empty() && self.soft.is_empty() && self.keywords.is_empty()
    }
}

/// Extracts hard skills, soft skills, and keywords against fixed lexicons.
#[derive(Debug, Clone)]
pub struct SkillMatcher {
    hard: Vec<String>,
    hard_lower: Vec<String>,
    soft: Vec<String>,
    scorer: Scorer,
}

impl Default for SkillMatcher {
    fn default() -> Self {
        Self::new(
            HARD_SKILLS.iter().map(|s| s.to_string()),
            SOFT_SKILLS.iter().map(|s| s.to_string()),
        )
    }
}

impl SkillMatcher {
    /// Build a matcher over custom lexicons.
    ///
    /// Duplicate entries (case-insensitive) are dropped, keeping the first.
    /// Soft entries that duplicate a hard entry are dropped so the two
    /// result sets stay disjoint.
    pub fn new(
        hard: impl IntoIterator<Item = String>,
        soft: impl IntoIterator<Item = String>,
    ) -> Self {
        let mut seen = HashSet::new();
        let hard: Vec<String> = hard
            .into_iter()
            .filter(|s| !s.trim().is_empty() && seen.insert(s.to_lowercase()))
            .collect();
        let soft: Vec<String> = soft
            .into_iter()
            .filter(|s| !s.trim().is_empty() && seen.insert(s.to_lowercase()))
            .collect();
        let hard_lower = hard.iter().map(|s| s.to_lowercase()).collect();

        Self {
            hard,
            hard_lower,
            soft,
            scorer: weighted_ratio,
        }
    }

    /// Replace the similarity function used by every fuzzy pass.
    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn scorer(&self) -> Scorer {
        self.scorer
    }

    pub fn hard_lexicon(&self) -> &[String] {
        &self.hard
    }

    pub fn soft_lexicon(&self) -> &[String] {
        &self.soft
    }

    /// Extract skills and keywords from a raw job description.
    ///
    /// Never fails; empty input yields an empty [`SkillExtraction`].
    pub fn extract(&self, jd_text: &str) -> SkillExtraction {
        let normalized = normalize_text(jd_text);
        let tokens = tokenize_lower(&normalized);
        let candidates = top_terms(&tokens, CANDIDATE_TOPN, CANDIDATE_MIN_LEN);

        let mut hard: BTreeSet<String> = BTreeSet::new();
        let mut soft: BTreeSet<String> = BTreeSet::new();
        let mut claimed: HashSet<&str> = HashSet::new();

        for cand in &candidates {
            if let Some((term, _)) = best_match(cand, &self.hard, EXTRACT_CUTOFF, self.scorer) {
                hard.insert(term.to_string());
                claimed.insert(cand.as_str());
            }
            if let Some((term, _)) = best_match(cand, &self.soft, EXTRACT_CUTOFF, self.scorer) {
                soft.insert(term.to_string());
                claimed.insert(cand.as_str());
            }
        }

        for cap in capitalized_terms(jd_text) {
            let lower = cap.to_lowercase();
            if let Some((matched, _)) =
                best_match(&lower, &self.hard_lower, PROPER_NOUN_CUTOFF, self.scorer)
            {
                if let Some(idx) = self.hard_lower.iter().position(|h| h == matched) {
                    hard.insert(self.hard[idx].clone());
                }
            }
        }

        let known: HashSet<String> = hard
            .iter()
            .chain(soft.iter())
            .map(|s| s.to_lowercase())
            .collect();
        let keywords = candidates
            .iter()
            .filter(|c| !claimed.contains(c.as_str()) && !known.contains(c.as_str()))
            .filter(|c| c.chars().count() >= KEYWORD_MIN_LEN)
            .cloned()
            .collect();

        SkillExtraction {
            hard: hard.into_iter().collect(),
            soft: soft.into_iter().collect(),
            keywords,
        }
    }
}

/// Extract with the built-in lexicons and the default scorer.
pub fn extract_keywords(jd_text: &str) -> SkillExtraction {
    SkillMatcher::default().extract(jd_text)
}
