//! System instructions for the four generated artifacts and the quick
//! question-answering prompt.

use serde::Serialize;

use crate::models::Profile;

pub const SYSTEM_SKILLS: &str = "
You are a job-application copilot. From the context:
1) HARD skills explicitly relevant to the JD and present in candidate/profile.
2) SOFT skills tailored to the JD.
3) 15–25 SEO keywords for CV/ATS.
Rules:
- Ground items in [RETRIEVED_*] where possible. No fabrications.
- Use canonical names. Output as three sections with bullet lists.
";

pub const SYSTEM_COVER: &str = "
You are an expert cover-letter writer. Using the context:
- Ground claims in [RETRIEVED_JD_SNIPPETS] and [RETRIEVED_PROFILE_SNIPPETS].
- <=350 words, 3–5 short paragraphs + a 'Relevant Highlights' bullet list (3–5).
- Quote exact JD terms where helpful. No invented experience.
- Confident and specific; clear call-to-action.
";

pub const SYSTEM_EMAILS: &str = "
Write three short emails tailored to the JD and candidate:
1) Application email (80–140 words) + 2–3 subject options.
2) Cold recruiter outreach (40–80 words) + 2–3 subject options.
3) Follow-up after 7–10 days (50–90 words) + 2–3 subject options.
Ground skills in [RETRIEVED_*]. No exaggeration. Clean signature from [PROFILE].
Format:
=== Email 1 ===
Subject: ...
Body:
...
=== Email 2 ===
...
=== Email 3 ===
...
";

pub const SYSTEM_ATS: &str = "
Create a compact ATS-friendly resume summary:
- 3 bullets (outcomes-focused) aligned to JD.
- One 'Core Stack' line (comma-separated tools).
Keep to 80–120 words. Ground in [RETRIEVED_*]; no fabrications.
";

/// One of the four generated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    SkillsKeywords,
    CoverLetter,
    Emails,
    AtsSummary,
}

impl Artifact {
    /// All artifacts in generation order.
    pub const ALL: [Artifact; 4] = [
        Artifact::SkillsKeywords,
        Artifact::CoverLetter,
        Artifact::Emails,
        Artifact::AtsSummary,
    ];

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Artifact::SkillsKeywords => SYSTEM_SKILLS,
            Artifact::CoverLetter => SYSTEM_COVER,
            Artifact::Emails => SYSTEM_EMAILS,
            Artifact::AtsSummary => SYSTEM_ATS,
        }
    }

    /// File name suffix after the `<timestamp>_` prefix, without extension.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Artifact::SkillsKeywords => "skills_keywords",
            Artifact::CoverLetter => "cover_letter",
            Artifact::Emails => "emails",
            Artifact::AtsSummary => "ats_summary",
        }
    }
}

const BASE_ASSISTANT: &str = "You are a helpful AI/ML job application assistant. \
You generate CV bullet points, cover letters, and email drafts \
tailored for AI/ML engineer roles.\n\n";

/// Generic assistant prompt, personalised with the profile when present.
pub fn build_basic_system_prompt(profile: Option<&Profile>) -> String {
    let Some(p) = profile else {
        return BASE_ASSISTANT.to_string();
    };
    format!(
        "{BASE_ASSISTANT}My name is {}. My title is {}. I am based in {}.\n\
         My skills include: {}.\n\
         My personal pitch: {}\n\n\
         Use this information to personalise the output.",
        p.name,
        p.title,
        p.location,
        p.skills.join(", "),
        p.pitch,
    )
}

/// User message for a free-form question over retrieved snippets.
pub fn build_answer_prompt(profile: Option<&Profile>, context: &str, question: &str) -> String {
    format!(
        "{}\n\nContext from my documents:\n{}\n\nUser request:\n{}\n\n\
         Write a clear, professional answer tailored for AI/ML job applications.\n\
         Avoid hallucinating technologies I don't know unless the user explicitly asks to learn them.\n",
        build_basic_system_prompt(profile),
        context,
        question,
    )
}
