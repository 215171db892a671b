//! Application state for the FAQ server

use std::sync::Arc;

use crate::assistant::Assistant;
use crate::config::FaqConfig;
use crate::error::Result;
use crate::providers::{build_provider, CompletionProvider};
use crate::secrets::SecretStore;
use crate::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: FaqConfig,
    /// FAQ, chat and summarization operations
    assistant: Assistant,
    /// Live sessions
    sessions: SessionStore,
}

impl AppState {
    /// Create state around an already-built provider
    pub fn new(config: FaqConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        tracing::info!(
            "Initializing FAQ state (provider: {}, model: {}, course: {})",
            provider.name(),
            provider.model(),
            config.course.display_name()
        );

        let assistant = Assistant::new(&config, provider);
        let sessions = SessionStore::with_capacity(config.server.max_sessions);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                assistant,
                sessions,
            }),
        }
    }

    /// Create state with the provider selected by `config.completion`
    pub fn from_config(config: FaqConfig, secrets: &dyn SecretStore) -> Result<Self> {
        let provider = build_provider(&config.completion, secrets)?;
        Ok(Self::new(config, provider))
    }

    pub fn config(&self) -> &FaqConfig {
        &self.inner.config
    }

    pub fn assistant(&self) -> &Assistant {
        &self.inner.assistant
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }
}
