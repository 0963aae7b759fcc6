//! Core data models shared by the pipeline, the stores, and the frontends.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The candidate profile: the single source of truth for what the
/// candidate has.
///
/// Every field defaults to empty, so a partially filled JSON file still
/// deserializes and the context assembler never sees a missing key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub location: String,
    pub target_role: String,
    pub domain_focus: String,
    pub persona_tone: String,
    pub role_keywords: Vec<String>,
    pub email: String,
    pub phone: String,
    pub links: Vec<String>,
    pub skills: Vec<String>,
    pub achievements: Vec<String>,
    pub pitch: String,
    pub role_preferences: RolePreferences,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolePreferences {
    pub industry: String,
    pub role_description: String,
    pub default_prompt_role: String,
}

/// Partition tag attached to every indexed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    /// Persistent candidate material (CVs, summaries).
    Profile,
    /// The job description of the current request.
    Jd,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Profile => "profile",
            DocType::Jd => "jd",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "profile" => Some(DocType::Profile),
            "jd" => Some(DocType::Jd),
            _ => None,
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded document prior to chunking.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    /// Where the text came from (file path or `"jd.txt"`).
    pub source: String,
    pub doc_type: DocType,
    pub title: Option<String>,
    /// Unix timestamp (seconds) of indexing.
    pub created_at: i64,
    pub body: String,
}

/// A chunk of a document's body text.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub chunk_index: i64,
    pub text: String,
    pub hash: String,
}

/// A chunk returned from the store, with the metadata retrieval filters on.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub document_id: String,
    pub source: String,
    pub doc_type: DocType,
    pub text: String,
    /// Backend score, higher is better (cosine similarity or negated BM25 rank).
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_tolerates_missing_fields() {
        let p: Profile = serde_json::from_str(r#"{"name": "Ada", "skills": ["Rust"]}"#).unwrap();
        assert_eq!(p.name, "Ada");
        assert_eq!(p.skills, vec!["Rust"]);
        assert!(p.email.is_empty());
        assert!(p.role_preferences.industry.is_empty());
    }

    #[test]
    fn test_doc_type_roundtrip() {
        for t in [DocType::Profile, DocType::Jd] {
            assert_eq!(DocType::parse(t.as_str()), Some(t));
        }
        assert_eq!(DocType::parse("resume"), None);
        assert_eq!(serde_json::to_string(&DocType::Jd).unwrap(), "\"jd\"");
    }
}
