//! Assembly of the context block handed to every generation prompt.
//!
//! The block is a plain-text document with six fixed section headers, in
//! this order:
//!
//! | Header | Content |
//! |--------|---------|
//! | `[PROFILE]` | Identity line, contact line, pitch, skills, achievements |
//! | `[JOB_DESCRIPTION_RAW]` | The pasted job description, verbatim |
//! | `[RETRIEVED_JD_SNIPPETS]` | Numbered JD snippets from the store |
//! | `[RETRIEVED_PROFILE_SNIPPETS]` | Numbered profile snippets from the store |
//! | `[EXTRACTED_FROM_JD]` | Hard skills, soft skills, first 30 keywords |
//! | `[ALIGNMENT_SUMMARY]` | Have-hard, have-soft, gaps |

use crate::alignment::Alignment;
use crate::matcher::SkillExtraction;
use crate::models::Profile;
use crate::text::bullet_list;

/// Section headers, in output order.
pub const SECTION_HEADERS: [&str; 6] = [
    "[PROFILE]",
    "[JOB_DESCRIPTION_RAW]",
    "[RETRIEVED_JD_SNIPPETS]",
    "[RETRIEVED_PROFILE_SNIPPETS]",
    "[EXTRACTED_FROM_JD]",
    "[ALIGNMENT_SUMMARY]",
];

/// Maximum number of keywords listed on the "Extra keywords" line.
pub const MAX_CONTEXT_KEYWORDS: usize = 30;

/// Everything the context block is built from.
#[derive(Debug, Clone, Copy)]
pub struct ContextInputs<'a> {
    pub profile: &'a Profile,
    pub jd_text: &'a str,
    /// Pre-formatted numbered list of JD snippets.
    pub jd_snippets: &'a str,
    /// Pre-formatted numbered list of profile snippets.
    pub profile_snippets: &'a str,
    pub extraction: &'a SkillExtraction,
    pub alignment: &'a Alignment,
}

/// Build the context block. Pure; never fails.
pub fn build_context(inputs: &ContextInputs<'_>) -> String {
    let p = inputs.profile;
    let ex = inputs.extraction;
    let al = inputs.alignment;
    let keywords: Vec<&str> = ex
        .keywords
        .iter()
        .take(MAX_CONTEXT_KEYWORDS)
        .map(String::as_str)
        .collect();

    format!(
        r#"
[PROFILE]
Name: {name} | Title: {title} | Location: {location}
Email: {email} | Phone: {phone} | Links: {links}

Pitch:
{pitch}

Skills:
{skills}

Achievements:
{achievements}

[JOB_DESCRIPTION_RAW]
{jd_text}

[RETRIEVED_JD_SNIPPETS]
{jd_snips}

[RETRIEVED_PROFILE_SNIPPETS]
{prof_snips}

[EXTRACTED_FROM_JD]
Hard skills: {jd_hard}
Soft skills: {jd_soft}
Extra keywords: {keywords}

[ALIGNMENT_SUMMARY]
You already have (hard): {have_hard}
You already have (soft): {have_soft}
Gaps to phrase carefully: {gaps}
"#,
        name = p.name,
        title = p.title,
        location = p.location,
        email = p.email,
        phone = p.phone,
        links = p.links.join(", "),
        pitch = p.pitch,
        skills = bullet_list(&p.skills),
        achievements = bullet_list(&p.achievements),
        jd_text = inputs.jd_text,
        jd_snips = inputs.jd_snippets,
        prof_snips = inputs.profile_snippets,
        jd_hard = ex.hard.join(", "),
        jd_soft = ex.soft.join(", "),
        keywords = keywords.join(", "),
        have_hard = al.have_hard.join(", "),
        have_soft = al.have_soft.join(", "),
        gaps = al.gaps.join(", "),
    )
}
