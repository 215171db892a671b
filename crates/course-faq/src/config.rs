//! Configuration for the FAQ assistant

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::generation::CourseProfile;
use crate::providers::ProviderKind;

/// Largest number of chunks ever sent to the model
pub const MAX_TOP_K: usize = 5;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Keyword retrieval and prompt budget
    pub retrieval: RetrievalConfig,
    /// Chat-completion backend
    pub completion: CompletionConfig,
    /// General chat and summarization
    pub chat: ChatConfig,
    /// Course profile used for the FAQ language instruction
    pub course: CourseProfile,
    /// Optional TOML secrets file (`POE_API_KEY = "..."`)
    pub secrets_path: Option<PathBuf>,
}

impl FaqConfig {
    /// Load configuration from a TOML file; missing sections take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break chunking or retrieval invariants
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be positive".into()));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::Config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 || self.retrieval.top_k > MAX_TOP_K {
            return Err(Error::Config(format!(
                "retrieval.top_k must be between 1 and {}",
                MAX_TOP_K
            )));
        }
        if self.retrieval.context_budget == 0 {
            return Err(Error::Config("retrieval.context_budget must be positive".into()));
        }
        if self.server.max_sessions == 0 {
            return Err(Error::Config("server.max_sessions must be positive".into()));
        }
        if self.completion.timeout_secs == 0 {
            return Err(Error::Config("completion.timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Secrets file location: explicit setting, else `<config dir>/course-faq/secrets.toml`
    pub fn secrets_file(&self) -> Option<PathBuf> {
        self.secrets_path.clone().or_else(|| {
            dirs::config_dir().map(|dir| dir.join("course-faq").join("secrets.toml"))
        })
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 25MB)
    pub max_upload_size: usize,
    /// Live sessions kept in memory; the oldest is evicted past this
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_cors: true,
            max_upload_size: 25 * 1024 * 1024,
            max_sessions: crate::session::DEFAULT_MAX_SESSIONS,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1200,
            chunk_overlap: 200,
        }
    }
}

/// Keyword retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Chunks passed to the prompt
    pub top_k: usize,
    /// Character budget for the concatenated context
    pub context_budget: usize,
    /// Shortest query token kept
    pub min_token_len: usize,
    /// Drop common English question words before scoring
    pub use_stopwords: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: MAX_TOP_K,
            context_budget: 4000,
            min_token_len: 2,
            use_stopwords: true,
        }
    }
}

/// Chat-completion backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Which backend to talk to
    pub provider: ProviderKind,
    /// Endpoint override (default: the provider's public endpoint)
    pub base_url: Option<String>,
    /// Model override (default: the provider's default model)
    pub model: Option<String>,
    /// Sampling temperature for FAQ answers
    pub temperature: f32,
    /// Output length cap
    pub max_tokens: Option<u32>,
    /// Request timeout in seconds; a timed-out call fails, it is not retried
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: None,
            model: None,
            temperature: 0.0,
            max_tokens: None,
            timeout_secs: 60,
        }
    }
}

impl CompletionConfig {
    /// Effective endpoint
    pub fn endpoint(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_endpoint().to_string())
    }

    /// Effective model name
    pub fn model_name(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }
}

/// General chat and summarization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Leading characters of the document attached to chat turns
    pub file_context_chars: usize,
    /// Characters shown in the extracted-text preview
    pub preview_chars: usize,
    pub summary_temperature: f32,
    pub summary_max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            file_context_chars: 4000,
            preview_chars: 2000,
            summary_temperature: 0.3,
            summary_max_tokens: 200,
        }
    }
}
