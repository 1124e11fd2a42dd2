// Assistant reply derivation for the chat command

mod context;
mod keyword;
mod ollama;

pub use context::build_system_context;
pub use keyword::KeywordResponder;
pub use ollama::OllamaResponder;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Assistant reply used whenever the responder fails or times out
pub const FALLBACK_REPLY: &str =
    "Error: Could not connect to local AI model. Please ensure Ollama is running.";

/// Input handed to a responder
#[derive(Clone, Debug)]
pub struct ResponderRequest {
    /// Summary of the current factory state
    pub system_context: String,
    pub user_message: String,
}

/// External responder failures
///
/// Never surfaced as a command failure; the engine swaps in [`FALLBACK_REPLY`].
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("responder unreachable: {0}")]
    Transport(String),

    #[error("responder returned HTTP {0}")]
    Status(u16),

    #[error("responder reply could not be parsed: {0}")]
    InvalidReply(String),
}

/// Derives one assistant reply for one user message
#[async_trait]
pub trait Responder: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    async fn respond(&self, request: &ResponderRequest) -> Result<String, ResponderError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponderKind {
    /// Canned keyword replies, no network
    Keyword,
    /// Ollama `/api/chat`
    Ollama,
}

/// Chat responder configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponderConfig {
    #[serde(default = "default_kind")]
    pub kind: ResponderKind,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Upper bound on one reply, after which the fallback is used
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_kind() -> ResponderKind {
    ResponderKind::Keyword
}

fn default_url() -> String {
    std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl ResponderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            url: default_url(),
            model: default_model(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Build the responder selected by `config`
pub fn build_responder(config: &ResponderConfig) -> Result<Arc<dyn Responder>> {
    let responder: Arc<dyn Responder> = match config.kind {
        ResponderKind::Keyword => Arc::new(KeywordResponder::new()),
        ResponderKind::Ollama => Arc::new(OllamaResponder::new(
            config.url.clone(),
            config.model.clone(),
            config.timeout(),
        )?),
    };
    Ok(responder)
}
