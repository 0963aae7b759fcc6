//! # Job Copilot Core
//!
//! Pure pipeline logic for the job-application copilot: text utilities,
//! fuzzy matching, skill extraction, profile alignment, context assembly,
//! chunking, retrieval, and the seams (`Store`, `Embedder`,
//! `PromptExecutor`) the app crate plugs real backends into.
//!
//! This crate does no network or filesystem I/O.

pub mod alignment;
pub mod chunk;
pub mod context;
pub mod embedding;
pub mod fuzzy;
pub mod lexicon;
pub mod llm;
pub mod matcher;
pub mod models;
pub mod prompts;
pub mod retrieval;
pub mod store;
pub mod text;
