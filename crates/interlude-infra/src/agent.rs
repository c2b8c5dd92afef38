//! Agent assembly from configuration.
//!
//! Builds every collaborator in order (LLM client, SQL runner, embedding
//! function, memory, user resolver, tool registry) and hands them to
//! [`AgentBuilder`]. Nothing here opens a network connection.

use std::sync::Arc;

use interlude_core::agent::tools::builtin_registry;
use interlude_core::agent::{Agent, BoxSqlRunner, BoxUserResolver, CookieUserResolver};
use interlude_core::llm::BoxLlmProvider;
use interlude_core::memory::{BoxAgentMemory, BoxEmbedder, HashEmbedder, InMemoryAgentMemory};
use interlude_types::agent::AgentConfig;
use interlude_types::config::{AgentSettings, InterludeConfig};
use interlude_types::error::AgentError;

use crate::embedding::OpenAiEmbedder;
use crate::llm::create_provider;
use crate::sql::MySqlRunner;

/// Dimension of the local fallback embedder.
const FALLBACK_EMBEDDING_DIMENSION: usize = 256;

/// Assemble the data agent described by `config`.
pub fn assemble_agent(config: &InterludeConfig) -> Result<Agent, AgentError> {
    let llm = Arc::new(create_provider(&config.llm));
    assemble_agent_with_llm(llm, config.llm.model.clone(), &config.agent)
}

/// Assemble the agent around an already-built LLM provider.
pub fn assemble_agent_with_llm(
    llm: Arc<BoxLlmProvider>,
    model: String,
    settings: &AgentSettings,
) -> Result<Agent, AgentError> {
    let sql = settings
        .sql
        .as_ref()
        .map(|sql| MySqlRunner::connect_lazy(sql).map(|r| Arc::new(BoxSqlRunner::new(r))))
        .transpose()?;

    let embedder = Arc::new(match &settings.embedding {
        Some(embedding) => BoxEmbedder::new(OpenAiEmbedder::new(embedding)?),
        None => {
            tracing::warn!("no [agent.embedding] configured; using local hash embeddings");
            BoxEmbedder::new(HashEmbedder::new(FALLBACK_EMBEDDING_DIMENSION))
        }
    });

    let memory = Arc::new(BoxAgentMemory::new(InMemoryAgentMemory::new(
        Arc::clone(&embedder),
        settings.memory.max_items,
    )));

    let user_resolver = BoxUserResolver::new(CookieUserResolver::new(settings.users.clone()));
    let tools = builtin_registry(&settings.tools, sql)?;

    Agent::builder()
        .llm(llm, model)
        .tool_registry(tools)
        .user_resolver(user_resolver)
        .memory(memory, embedder)
        .config(AgentConfig {
            max_tool_iterations: settings.max_tool_iterations,
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlude_types::agent::RequestContext;
    use interlude_types::config::{EmbeddingConfig, SqlConfig, ToolGrant};

    #[tokio::test]
    async fn test_default_config_assembles_without_sql() {
        let agent = assemble_agent(&InterludeConfig::default()).unwrap();
        assert_eq!(agent.config().max_tool_iterations, 100);
        assert!(agent.tools().get("run_sql").is_none());
        assert_eq!(agent.tools().len(), 4);

        let guest = agent.resolve_user(&RequestContext::default()).await;
        let inventory = agent.describe(&guest).await;
        assert_eq!(inventory.provider, "openai_compatible");
        assert_eq!(inventory.model, "gpt-4o-mini");
        assert_eq!(inventory.embedding_model, "local-hash");
        assert_eq!(inventory.memory_max_items, 1000);
    }

    #[tokio::test]
    async fn test_full_config_assembles_lazily() {
        let mut config = InterludeConfig::default();
        config.agent.sql = Some(SqlConfig {
            url: "mysql://root:pw@10.255.255.1:3306/shop".to_string(),
            max_connections: 5,
        });
        config.agent.embedding = Some(EmbeddingConfig {
            base_url: "http://10.255.255.1:18081/v1".to_string(),
            model: "Qwen3-Embedding-8B".to_string(),
            api_key: None,
            dimensions: Some(4096),
            batch_size: 32,
        });
        config.agent.max_tool_iterations = 12;

        let agent = assemble_agent(&config).unwrap();
        assert!(agent.tools().get("run_sql").is_some());
        assert_eq!(agent.config().max_tool_iterations, 12);

        let admin = agent
            .resolve_user(&RequestContext::from_cookie_header("vanna_email=admin@example.com"))
            .await;
        let inventory = agent.describe(&admin).await;
        assert_eq!(inventory.embedding_model, "Qwen3-Embedding-8B");
        assert_eq!(inventory.embedding_dimension, 4096);
        assert!(inventory.hidden_tools.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_grant_fails() {
        let mut config = InterludeConfig::default();
        config.agent.tools.push(ToolGrant::new("drop_tables", &["admin"]));
        let err = assemble_agent(&config).err().unwrap();
        assert!(matches!(err, AgentError::UnknownTool(name) if name == "drop_tables"));
    }

    #[tokio::test]
    async fn test_bad_sql_url_fails() {
        let mut config = InterludeConfig::default();
        config.agent.sql = Some(SqlConfig {
            url: "not a url".to_string(),
            max_connections: 5,
        });
        assert!(matches!(assemble_agent(&config), Err(AgentError::Sql(_))));
    }
}
