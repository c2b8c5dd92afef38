//! Configuration for the OpenAI-compatible provider.

use secrecy::SecretString;

use interlude_types::config::LlmConfig;
use interlude_types::llm::ProviderCapabilities;

/// Name reported by providers built from `[llm]`.
pub const PROVIDER_NAME: &str = "openai_compatible";

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Does not derive Debug: it holds the API key.
pub struct OpenAiCompatConfig {
    /// Human-readable provider name.
    pub provider_name: String,
    /// Base URL for the API (e.g. "https://api.openai.com/v1").
    pub base_url: String,
    /// Bearer token; local servers often need none.
    pub api_key: Option<SecretString>,
    /// Default model when a request leaves it empty.
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

impl OpenAiCompatConfig {
    pub fn from_llm_config(config: &LlmConfig) -> Self {
        Self {
            provider_name: PROVIDER_NAME.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .as_ref()
                .filter(|k| !k.is_empty())
                .map(|k| SecretString::from(k.clone())),
            model: config.model.clone(),
            capabilities: ProviderCapabilities::default(),
        }
    }
}
