//! # Job Copilot
//!
//! A local-first job application copilot. Paste a job description; get a
//! tailored skills list, cover letter, outreach emails and ATS summary,
//! grounded in your own CVs and notes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────┐
//! │ profile_docs │──▶│ Chunk+Embed  │──▶│  SQLite   │
//! │ + pasted JD  │   │   (ingest)   │   │ FTS5+Vec  │
//! └──────────────┘   └──────────────┘   └─────┬─────┘
//!                                             │ retrieve
//!  profile.json ──▶ extract ──▶ align ──▶ build context ──▶ 4 × LLM
//!                                                              │
//!                                         ┌────────────────────┤
//!                                         ▼                    ▼
//!                                   ┌──────────┐         ┌──────────┐
//!                                   │   CLI    │         │   HTTP   │
//!                                   │  (jcp)   │         │  (axum)  │
//!                                   └──────────┘         └──────────┘
//! ```
//!
//! The pure pipeline pieces (matcher, alignment, context, chunking,
//! retrieval, collaborator traits) live in `job-copilot-core`; this crate
//! adds the SQLite store, HTTP providers, file handling and frontends.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] / [`migrate`] | SQLite connection and schema |
//! | [`sqlite_store`] | [`Store`](job_copilot_core::store::Store) over SQLite |
//! | [`embedding`] | Ollama, OpenAI and local embedders |
//! | [`llm`] | Ollama and OpenAI chat providers |
//! | [`retry`] | Shared HTTP backoff |
//! | [`extract`] | Text extraction from md/txt/pdf/docx |
//! | [`ingest`] | Profile document and JD indexing |
//! | [`profile`] | JSON profile store |
//! | [`generate`] | The orchestrator |
//! | [`output`] | Timestamped artifact files |
//! | [`server`] | HTTP API |

pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod generate;
pub mod ingest;
pub mod llm;
pub mod migrate;
pub mod output;
pub mod profile;
pub mod retry;
pub mod server;
pub mod sqlite_store;
