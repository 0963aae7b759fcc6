//! Chat-model seam.
//!
//! Every generation call in the pipeline is a single system + user
//! exchange. Providers (Ollama, OpenAI) implement [`PromptExecutor`] in the
//! app crate; tests substitute in-process fakes.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PromptExecutor: Send + Sync {
    /// Short label for logs, e.g. `"ollama:llama3.2:3b"`.
    fn name(&self) -> String;

    /// Send one system instruction and one user message; return the
    /// model's text reply.
    async fn invoke(&self, system: &str, user: &str) -> Result<String>;
}
