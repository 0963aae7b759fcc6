//! Chat-model providers implementing [`PromptExecutor`].
//!
//! - **[`OllamaChat`]**: `POST {url}/api/chat` with `stream: false`.
//! - **[`OpenAiChat`]**: `POST {url}/v1/chat/completions`; needs
//!   `OPENAI_API_KEY`.
//!
//! Both send one system message and one user message at the configured
//! temperature and retry transient failures with exponential backoff.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use job_copilot_core::llm::PromptExecutor;

use crate::config::LlmConfig;
use crate::retry::post_json;

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com";

fn messages(system: &str, user: &str) -> Value {
    json!([
        { "role": "system", "content": system },
        { "role": "user", "content": user },
    ])
}

fn http_client(config: &LlmConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

pub struct OllamaChat {
    client: reqwest::Client,
    url: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl OllamaChat {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl PromptExecutor for OllamaChat {
    fn name(&self) -> String {
        format!("ollama:{}", self.model)
    }

    async fn invoke(&self, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": messages(system, user),
            "stream": false,
            "options": { "temperature": self.temperature },
        });
        let endpoint = format!("{}/api/chat", self.url);
        let resp = post_json(&self.client, &endpoint, None, &body, self.max_retries, "Ollama")
            .await
            .inspect_err(|e| {
                warn!(url = %self.url, error = %e, "Ollama chat failed; is Ollama running?")
            })?;
        parse_ollama_chat(&resp)
    }
}

/// Extract `message.content` from an Ollama `/api/chat` response.
pub fn parse_ollama_chat(json: &Value) -> Result<String> {
    json.pointer("/message/content")
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid Ollama response: missing message.content"))
}

pub struct OpenAiChat {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
}

impl OpenAiChat {
    /// `llm.url` is used as the API base when it is not the Ollama default.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        let url = if config.url.contains("localhost:11434") {
            OPENAI_DEFAULT_URL.to_string()
        } else {
            config.url.trim_end_matches('/').to_string()
        };
        Ok(Self {
            client: http_client(config)?,
            url,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl PromptExecutor for OpenAiChat {
    fn name(&self) -> String {
        format!("openai:{}", self.model)
    }

    async fn invoke(&self, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": messages(system, user),
            "temperature": self.temperature,
        });
        let endpoint = format!("{}/v1/chat/completions", self.url);
        let resp = post_json(
            &self.client,
            &endpoint,
            Some(&self.api_key),
            &body,
            self.max_retries,
            "OpenAI",
        )
        .await?;
        parse_openai_chat(&resp)
    }
}

/// Extract `choices[0].message.content` from a chat completion.
pub fn parse_openai_chat(json: &Value) -> Result<String> {
    json.pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing choices[0].message.content"))
}

/// Build the configured chat provider.
pub fn create_executor(config: &LlmConfig) -> Result<Arc<dyn PromptExecutor>> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaChat::new(config)?)),
        "openai" => Ok(Arc::new(OpenAiChat::new(config)?)),
        other => bail!("Unknown llm provider: {}", other),
    }
}
