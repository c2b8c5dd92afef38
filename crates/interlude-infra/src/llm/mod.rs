//! LLM provider implementations.
//!
//! Contains the OpenAI-compatible implementation of the [`LlmProvider`]
//! trait defined in `interlude-core`, and a factory ([`create_provider`])
//! that builds it from `[llm]`.
//!
//! [`LlmProvider`]: interlude_core::llm::LlmProvider

pub mod openai_compat;

use interlude_core::llm::BoxLlmProvider;
use interlude_types::config::LlmConfig;

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Create a [`BoxLlmProvider`] from `[llm]`.
///
/// A missing API key is not an error here: local OpenAI-compatible servers
/// usually accept anonymous requests, and hosted ones answer 401, which
/// surfaces as `LlmError::AuthenticationFailed` on the first turn.
pub fn create_provider(config: &LlmConfig) -> BoxLlmProvider {
    let oai_config = OpenAiCompatConfig::from_llm_config(config);
    if oai_config.api_key.is_none() {
        tracing::warn!(base_url = %oai_config.base_url, "no LLM API key configured");
    }
    tracing::debug!(
        base_url = %oai_config.base_url,
        model = %oai_config.model,
        "creating LLM provider"
    );
    BoxLlmProvider::new(OpenAiCompatibleProvider::new(oai_config))
}
