//! Application state shared by the HTTP handlers.
//!
//! Holds the turn executor (which owns the conversation store and the LLM
//! provider) and the SSE keep-alive interval. Cloning is cheap.

use std::sync::Arc;
use std::time::Duration;

use interlude_core::chat::{ConversationStore, TurnExecutor, TurnSettings};
use interlude_core::llm::BoxLlmProvider;
use interlude_infra::llm::create_provider;
use interlude_types::config::InterludeConfig;

#[derive(Clone)]
pub struct AppState {
    pub executor: TurnExecutor,
    pub keep_alive: Duration,
}

impl AppState {
    /// Wire the service from configuration: a fresh store and the
    /// OpenAI-compatible provider from `[llm]`.
    pub fn from_config(config: &InterludeConfig) -> Self {
        let provider = Arc::new(create_provider(&config.llm));
        Self::with_provider(config, provider)
    }

    /// Same as [`AppState::from_config`] with a caller-supplied provider.
    pub fn with_provider(config: &InterludeConfig, provider: Arc<BoxLlmProvider>) -> Self {
        let settings = TurnSettings::from_config(&config.llm, &config.server);
        Self {
            executor: TurnExecutor::new(ConversationStore::new(), provider, settings),
            keep_alive: Duration::from_secs(config.server.keep_alive_secs.max(1)),
        }
    }

    pub fn store(&self) -> &ConversationStore {
        self.executor.store()
    }
}
