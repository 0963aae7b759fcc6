//! JSON-file profile store.
//!
//! The profile file (`<rag_dir>/profile_settings.json` by default) is the
//! single source of truth for what the candidate has. A missing file means
//! no profile is configured; `jcp init` or [`ProfileStore::reset`] writes
//! the built-in default for the user to edit.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use job_copilot_core::models::{Profile, RolePreferences};

#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the profile.
    ///
    /// - no file → `Ok(None)`
    /// - unparseable JSON → the default profile, written back over the file
    pub fn load(&self) -> Result<Option<Profile>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read profile: {}", self.path.display()))?;
        match serde_json::from_str::<Profile>(&raw) {
            Ok(profile) => Ok(Some(profile)),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "profile file is not valid JSON, restoring default"
                );
                Ok(Some(self.reset()?))
            }
        }
    }

    /// Persist `profile` as pretty-printed JSON, creating parent directories.
    pub fn save(&self, profile: &Profile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(profile)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write profile: {}", self.path.display()))?;
        Ok(())
    }

    /// Overwrite the file with the default profile and return it.
    pub fn reset(&self) -> Result<Profile> {
        let profile = default_profile();
        self.save(&profile)?;
        info!(path = %self.path.display(), "profile reset to default");
        Ok(profile)
    }

    /// Write the default profile unless a file already exists. Returns
    /// `true` when a file was created.
    pub fn ensure_default(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        self.reset()?;
        Ok(true)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The built-in starter profile. Contact details are placeholders.
pub fn default_profile() -> Profile {
    Profile {
        name: "Your Name".to_string(),
        title: "Full-Stack Developer | Cloud Engineer | Applied AI Engineer".to_string(),
        location: "City, Country".to_string(),
        target_role: "Full-Stack / Cloud Engineer with Applied AI".to_string(),
        domain_focus: "Cloud, Backend, Applied ML Systems".to_string(),
        persona_tone: "Technical, concise, outcome-oriented".to_string(),
        role_keywords: strings(&[
            "Full-Stack Development",
            "Cloud Engineering",
            "Serverless",
            "Applied Machine Learning",
            "LLM Applications",
            "Backend Engineering",
            "Distributed Systems",
        ]),
        email: "you@example.com".to_string(),
        phone: "+00 000 000 000".to_string(),
        links: strings(&[
            "https://github.com/your-handle",
            "https://www.linkedin.com/in/your-handle",
        ]),
        skills: strings(&[
            "JavaScript",
            "TypeScript",
            "Python",
            "Java",
            "React",
            "React Native (Expo)",
            "Node.js",
            "Express.js",
            "FastAPI",
            "AWS Lambda",
            "API Gateway",
            "Aurora Serverless",
            "S3",
            "Cognito",
            "CloudWatch",
            "Docker",
            "CI/CD",
            "ECS Fargate",
            "Terraform",
            "Applied Machine Learning",
            "TensorFlow Lite",
            "YOLO",
            "Audio/Image/Video Inference",
            "RAG Systems",
            "Vector Databases",
            "System Design",
            "Architecture",
            "Problem Solving",
            "Cross-cultural Collaboration",
            "Teamwork",
            "Communication",
        ]),
        achievements: strings(&[
            "Designed and deployed production-grade AWS serverless architectures (Lambda, Aurora, API Gateway, Secrets Manager).",
            "Built multimodal inference systems (audio, image, video) using Docker, TFLite, YOLO, and AWS Fargate.",
            "Created a job application RAG assistant that parses job descriptions and generates tailored applications.",
            "Developed multiple full-stack apps and cloud systems used in real-world demos and industry showcases.",
        ]),
        pitch: "I build practical, production-ready software across full-stack, cloud, and applied AI. \
                My work focuses on turning ideas into reliable systems, from mobile apps and backend services \
                to serverless architectures and multimodal ML inference pipelines."
            .to_string(),
        role_preferences: RolePreferences {
            industry: "Cloud + Applied AI".to_string(),
            role_description: "Full-stack, backend, and cloud engineering with production ML experience"
                .to_string(),
            default_prompt_role: "Full-stack and cloud engineering job application assistant".to_string(),
        },
    }
}
