//! Reconcile the candidate's declared skills against job-description demands.
//!
//! Each profile skill is matched independently against the JD hard set and
//! the JD soft set (cutoff 88). A match records the JD-side term, so two
//! profile phrasings of the same skill collapse into one "have" entry, and
//! the profile's own wording is not kept.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fuzzy::{best_match, weighted_ratio, Scorer};

/// Cutoff for profile-to-JD matching.
pub const ALIGN_CUTOFF: f64 = 88.0;

/// One profile skill matched to one JD term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlap {
    pub yours: String,
    pub theirs: String,
    pub score: f64,
}

/// Have/gap sets for one job description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    /// JD hard skills the profile covers, sorted.
    pub have_hard: Vec<String>,
    /// JD soft skills the profile covers, sorted.
    pub have_soft: Vec<String>,
    /// JD skills (hard first, then soft) the profile does not cover.
    pub gaps: Vec<String>,
}

/// Match every profile skill against `theirs`, keeping those at or above
/// `cutoff`.
pub fn fuzzy_overlap<S: AsRef<str>, T: AsRef<str>>(
    yours: &[S],
    theirs: &[T],
    cutoff: f64,
    scorer: Scorer,
) -> Vec<Overlap> {
    yours
        .iter()
        .filter_map(|y| {
            best_match(y.as_ref(), theirs, cutoff, scorer).map(|(matched, score)| Overlap {
                yours: y.as_ref().to_string(),
                theirs: matched.to_string(),
                score,
            })
        })
        .collect()
}

/// Compute have/gap sets with the given scorer.
pub fn align_with<S: AsRef<str>>(
    profile_skills: &[S],
    jd_hard: &[String],
    jd_soft: &[String],
    scorer: Scorer,
) -> Alignment {
    let have_hard: BTreeSet<String> = fuzzy_overlap(profile_skills, jd_hard, ALIGN_CUTOFF, scorer)
        .into_iter()
        .map(|o| o.theirs)
        .collect();
    let have_soft: BTreeSet<String> = fuzzy_overlap(profile_skills, jd_soft, ALIGN_CUTOFF, scorer)
        .into_iter()
        .map(|o| o.theirs)
        .collect();

    let gaps = jd_hard
        .iter()
        .chain(jd_soft.iter())
        .filter(|s| !have_hard.contains(*s) && !have_soft.contains(*s))
        .cloned()
        .collect();

    Alignment {
        have_hard: have_hard.into_iter().collect(),
        have_soft: have_soft.into_iter().collect(),
        gaps,
    }
}

/// Compute have/gap sets with the default weighted-ratio scorer.
pub fn compute_alignment<S: AsRef<str>>(
    profile_skills: &[S],
    jd_hard: &[String],
    jd_soft: &[String],
) -> Alignment {
    align_with(profile_skills, jd_hard, jd_soft, weighted_ratio)
}
