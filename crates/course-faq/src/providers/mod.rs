//! Chat-completion backends
//!
//! Every backend sits behind [`CompletionProvider`]; which one is used is decided by
//! `completion.provider` in the configuration, never by the calling code.

pub mod openai_compat;
pub mod rule_based;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;
use crate::error::Result;
use crate::secrets::SecretStore;
use crate::types::ChatMessage;

pub use openai_compat::OpenAiCompatClient;
pub use rule_based::RuleBasedProvider;

/// One chat-completion call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// Trait for chat-completion backends
///
/// Implementations:
/// - `OpenAiCompatClient`: any OpenAI-style `/chat/completions` endpoint (Poe, OpenAI,
///   Together, ZhipuAI, Ollama)
/// - `RuleBasedProvider`: offline canned replies
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send the messages and return the first choice's text. No retries.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}

/// Known completion backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Poe's OpenAI-compatible API
    #[default]
    Poe,
    #[serde(rename = "openai")]
    OpenAi,
    Together,
    /// ZhipuAI (GLM models)
    Zhipu,
    /// Local Ollama server, no key
    Ollama,
    /// Offline keyword bot
    RuleBased,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poe => "poe",
            Self::OpenAi => "openai",
            Self::Together => "together",
            Self::Zhipu => "zhipu",
            Self::Ollama => "ollama",
            Self::RuleBased => "rule_based",
        }
    }

    /// Full chat-completions URL
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::Poe => "https://api.poe.com/v1/chat/completions",
            Self::OpenAi => "https://api.openai.com/v1/chat/completions",
            Self::Together => "https://api.together.xyz/v1/chat/completions",
            Self::Zhipu => "https://open.bigmodel.cn/api/paas/v4/chat/completions",
            Self::Ollama => "http://localhost:11434/v1/chat/completions",
            Self::RuleBased => "",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Poe => "gpt-4o-mini",
            Self::OpenAi => "gpt-4o-mini",
            Self::Together => "meta-llama/Llama-3.3-70B-Instruct-Turbo",
            Self::Zhipu => "glm-4",
            Self::Ollama => "llama3.2",
            Self::RuleBased => "rule-based",
        }
    }

    /// Secret holding the bearer token, if the backend needs one
    pub fn secret_key(&self) -> Option<&'static str> {
        match self {
            Self::Poe => Some("POE_API_KEY"),
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Together => Some("TOGETHER_API_KEY"),
            Self::Zhipu => Some("ZHIPUAI_API_KEY"),
            Self::Ollama | Self::RuleBased => None,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "poe" => Ok(Self::Poe),
            "openai" => Ok(Self::OpenAi),
            "together" => Ok(Self::Together),
            "zhipu" | "zhipuai" => Ok(Self::Zhipu),
            "ollama" => Ok(Self::Ollama),
            "rule_based" | "rule-based" => Ok(Self::RuleBased),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

/// Build the configured provider.
///
/// A missing credential is not an error here; the client reports it as
/// `Error::Auth` on its first call.
pub fn build_provider(
    config: &CompletionConfig,
    secrets: &dyn SecretStore,
) -> Result<Arc<dyn CompletionProvider>> {
    if config.provider == ProviderKind::RuleBased {
        tracing::info!("Using offline rule-based provider");
        return Ok(Arc::new(RuleBasedProvider::new()));
    }

    let api_key = config.provider.secret_key().and_then(|key| secrets.get(key));
    if let (Some(key), None) = (config.provider.secret_key(), &api_key) {
        tracing::warn!("{} is not configured; model calls will fail until it is set", key);
    }

    let client = OpenAiCompatClient::new(
        config.provider,
        config.endpoint(),
        config.model_name(),
        api_key,
        Duration::from_secs(config.timeout_secs),
    )?;

    tracing::info!(
        "Using {} provider at {} (model: {})",
        config.provider,
        client.endpoint(),
        client.model()
    );

    Ok(Arc::new(client))
}
