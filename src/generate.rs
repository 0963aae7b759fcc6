//! The generation orchestrator.
//!
//! [`Copilot::run`] takes a pasted job description through the whole
//! pipeline:
//!
//! ```text
//! load profile ──▶ index profile docs + JD ──▶ retrieve JD / profile snippets
//!      │                                              │
//!      └─▶ extract skills ──▶ align ──▶ build context ◀┘
//!                                          │
//!            ┌──────────────┬──────────────┼──────────────┐
//!            ▼              ▼              ▼              ▼
//!     skills_keywords  cover_letter     emails       ats_summary
//! ```
//!
//! The four generation calls share one immutable context, run
//! concurrently, and each is bounded by `llm.timeout_secs`. The first
//! failure aborts the request.

use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use job_copilot_core::alignment::{compute_alignment, Alignment};
use job_copilot_core::context::{build_context, ContextInputs};
use job_copilot_core::embedding::Embedder;
use job_copilot_core::llm::PromptExecutor;
use job_copilot_core::matcher::{SkillExtraction, SkillMatcher};
use job_copilot_core::models::{DocType, Profile, ScoredChunk};
use job_copilot_core::prompts::{build_answer_prompt, Artifact};
use job_copilot_core::retrieval::{
    format_snippets, Retriever, JD_FOCUS_QUERY, PROFILE_FOCUS_QUERY,
};
use job_copilot_core::store::Store;

use crate::config::{Config, DataConfig};
use crate::embedding::create_embedder;
use crate::error::PipelineError;
use crate::ingest::Indexer;
use crate::llm::create_executor;
use crate::output::write_artifacts;
use crate::profile::ProfileStore;
use crate::sqlite_store::SqliteStore;

/// System instruction for free-form questions.
const ASK_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Everything one generation run produces.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationPackage {
    pub context: String,
    pub skills: String,
    pub cover: String,
    pub emails: String,
    pub ats: String,
    pub jd_hard: Vec<String>,
    pub jd_soft: Vec<String>,
    pub keywords: Vec<String>,
    pub have_hard: Vec<String>,
    pub have_soft: Vec<String>,
    pub gaps: Vec<String>,
    /// Artifact files written when persistence was requested.
    pub files: Vec<PathBuf>,
}

/// Skill extraction for a job description, with alignment when a profile
/// is configured.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub extraction: SkillExtraction,
    pub alignment: Option<Alignment>,
}

/// Answer to a free-form question, with the snippets it was grounded on.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<ScoredChunk>,
}

/// Extract skills from `jd_text`; align them when a profile is given.
pub fn analyze(matcher: &SkillMatcher, profile: Option<&Profile>, jd_text: &str) -> Analysis {
    let extraction = matcher.extract(jd_text);
    let alignment =
        profile.map(|p| compute_alignment(&p.skills, &extraction.hard, &extraction.soft));
    Analysis {
        extraction,
        alignment,
    }
}

pub struct Copilot {
    indexer: Indexer,
    retriever: Retriever,
    executor: Arc<dyn PromptExecutor>,
    profiles: ProfileStore,
    matcher: SkillMatcher,
    data: DataConfig,
    call_timeout: Duration,
}

impl Copilot {
    /// Assemble a copilot from already-built collaborators.
    pub fn new(
        config: &Config,
        store: Arc<dyn Store>,
        embedder: Option<Arc<dyn Embedder>>,
        executor: Arc<dyn PromptExecutor>,
    ) -> Self {
        let retriever = Retriever::new(store.clone(), embedder.clone())
            .with_limits(config.retrieval.top_k, config.retrieval.candidate_k);
        Self {
            indexer: Indexer::new(store, embedder, config.chunking.clone()),
            retriever,
            executor,
            profiles: ProfileStore::new(config.data.profile_file()),
            matcher: SkillMatcher::default(),
            data: config.data.clone(),
            call_timeout: Duration::from_secs(config.llm.timeout_secs),
        }
    }

    /// Open the SQLite store and build the configured providers.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::open(config).await?);
        let embedder = create_embedder(&config.embedding)?;
        let executor = create_executor(&config.llm)?;
        Ok(Self::new(config, store, embedder, executor))
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn indexer(&self) -> &Indexer {
        &self.indexer
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    fn require_profile(&self) -> Result<Profile, PipelineError> {
        self.profiles
            .load()?
            .ok_or_else(|| PipelineError::ProfileNotConfigured {
                path: self.profiles.path().to_path_buf(),
            })
    }

    /// Extract skills from `jd_text` and align them with the profile, if
    /// one is configured. No indexing and no model calls.
    pub fn analyze(&self, jd_text: &str) -> Result<Analysis> {
        let profile = self.profiles.load()?;
        Ok(analyze(&self.matcher, profile.as_ref(), jd_text))
    }

    /// Run the full pipeline for one job description.
    pub async fn run(
        &self,
        jd_text: &str,
        persist: bool,
    ) -> Result<ApplicationPackage, PipelineError> {
        let profile = self.require_profile()?;

        self.indexer
            .index_profile_docs(&self.data.profile_docs_path())
            .await?;
        self.indexer
            .index_jd_text(&self.data.rag_path(), jd_text)
            .await?;

        let jd_hits = self
            .retriever
            .retrieve(JD_FOCUS_QUERY, Some(DocType::Jd))
            .await?;
        let profile_hits = self
            .retriever
            .retrieve(PROFILE_FOCUS_QUERY, Some(DocType::Profile))
            .await?;
        let jd_snippets = format_snippets(&jd_hits);
        let profile_snippets = format_snippets(&profile_hits);

        let extraction = self.matcher.extract(jd_text);
        let alignment = compute_alignment(&profile.skills, &extraction.hard, &extraction.soft);
        info!(
            hard = extraction.hard.len(),
            soft = extraction.soft.len(),
            keywords = extraction.keywords.len(),
            have = alignment.have_hard.len() + alignment.have_soft.len(),
            gaps = alignment.gaps.len(),
            "aligned profile with job description"
        );

        let context = build_context(&ContextInputs {
            profile: &profile,
            jd_text,
            jd_snippets: &jd_snippets,
            profile_snippets: &profile_snippets,
            extraction: &extraction,
            alignment: &alignment,
        });

        info!(model = %self.executor.name(), "generating application package");
        let (skills, cover, emails, ats) = tokio::try_join!(
            self.generate(Artifact::SkillsKeywords, &context),
            self.generate(Artifact::CoverLetter, &context),
            self.generate(Artifact::Emails, &context),
            self.generate(Artifact::AtsSummary, &context),
        )?;

        let files = if persist {
            let out_dir = self.data.outputs_path();
            let files = write_artifacts(
                &out_dir,
                &chrono::Local::now(),
                &[
                    (Artifact::SkillsKeywords, skills.as_str()),
                    (Artifact::CoverLetter, cover.as_str()),
                    (Artifact::Emails, emails.as_str()),
                    (Artifact::AtsSummary, ats.as_str()),
                ],
            )?;
            info!(dir = %out_dir.display(), files = files.len(), "saved artifacts");
            files
        } else {
            Vec::new()
        };

        Ok(ApplicationPackage {
            context,
            skills,
            cover,
            emails,
            ats,
            jd_hard: extraction.hard,
            jd_soft: extraction.soft,
            keywords: extraction.keywords,
            have_hard: alignment.have_hard,
            have_soft: alignment.have_soft,
            gaps: alignment.gaps,
            files,
        })
    }

    async fn generate(&self, artifact: Artifact, context: &str) -> Result<String, PipelineError> {
        let call = self.executor.invoke(artifact.system_prompt(), context);
        self.bounded(format!("{} generation", artifact.file_stem()), call)
            .await
    }

    async fn bounded(
        &self,
        task: String,
        call: impl std::future::Future<Output = Result<String>>,
    ) -> Result<String, PipelineError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(reply) => Ok(reply?),
            Err(_) => Err(PipelineError::Timeout {
                task,
                secs: self.call_timeout.as_secs(),
            }),
        }
    }

    /// Answer a free-form question from the indexed documents.
    pub async fn ask(&self, question: &str) -> Result<Answer, PipelineError> {
        let profile = self.profiles.load()?;
        let sources = self.retriever.retrieve(question, None).await?;
        let prompt = build_answer_prompt(profile.as_ref(), &format_snippets(&sources), question);
        let call = self.executor.invoke(ASK_SYSTEM_PROMPT, &prompt);
        let answer = self.bounded("answer".to_string(), call).await?;
        Ok(Answer { answer, sources })
    }
}
