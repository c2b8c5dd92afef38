//! Agent and AgentBuilder.
//!
//! Components are supplied one at a time and validated together in
//! `build()`. The assembled `Agent` resolves users, runs tools on their
//! behalf with access checks, and reports what each user can see.

use std::sync::Arc;

use interlude_types::agent::{
    AgentConfig, AgentInventory, RequestContext, ToolCall, ToolResult, User,
};
use interlude_types::error::{AgentError, ToolError};

use crate::llm::BoxLlmProvider;
use crate::memory::{BoxAgentMemory, BoxEmbedder};

use super::registry::ToolRegistry;
use super::tool::ToolContext;
use super::user::BoxUserResolver;

pub struct Agent {
    llm: Arc<BoxLlmProvider>,
    model: String,
    tools: Arc<ToolRegistry>,
    user_resolver: Arc<BoxUserResolver>,
    memory: Arc<BoxAgentMemory>,
    embedder: Arc<BoxEmbedder>,
    config: AgentConfig,
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::default()
    }

    pub fn llm(&self) -> &BoxLlmProvider {
        &self.llm
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn memory(&self) -> &Arc<BoxAgentMemory> {
        &self.memory
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub async fn resolve_user(&self, ctx: &RequestContext) -> User {
        self.user_resolver.resolve_user(ctx).await
    }

    /// Run a tool call as `user`.
    pub async fn execute_tool(&self, user: &User, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let ctx = ToolContext::new(user.clone(), Arc::clone(&self.memory));
        self.tools.execute(&ctx, call).await
    }

    /// What `user` sees of this agent.
    pub async fn describe(&self, user: &User) -> AgentInventory {
        let tools = self.tools.tools_for(user);
        let hidden_tools = self
            .tools
            .names()
            .into_iter()
            .filter(|name| !tools.iter().any(|t| t.name == *name))
            .map(str::to_string)
            .collect();
        AgentInventory {
            user: user.clone(),
            provider: self.llm.name().to_string(),
            model: self.model.clone(),
            embedding_model: self.embedder.model_name().to_string(),
            embedding_dimension: self.embedder.dimension(),
            memory_max_items: self.memory.max_items(),
            memory_len: self.memory.len().await,
            max_tool_iterations: self.config.max_tool_iterations,
            tools,
            hidden_tools,
        }
    }
}

#[derive(Default)]
pub struct AgentBuilder {
    llm: Option<Arc<BoxLlmProvider>>,
    model: Option<String>,
    tools: Option<ToolRegistry>,
    user_resolver: Option<BoxUserResolver>,
    memory: Option<Arc<BoxAgentMemory>>,
    embedder: Option<Arc<BoxEmbedder>>,
    config: AgentConfig,
}

impl AgentBuilder {
    pub fn llm(mut self, llm: Arc<BoxLlmProvider>, model: impl Into<String>) -> Self {
        self.llm = Some(llm);
        self.model = Some(model.into());
        self
    }

    pub fn tool_registry(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn user_resolver(mut self, resolver: BoxUserResolver) -> Self {
        self.user_resolver = Some(resolver);
        self
    }

    pub fn memory(mut self, memory: Arc<BoxAgentMemory>, embedder: Arc<BoxEmbedder>) -> Self {
        self.memory = Some(memory);
        self.embedder = Some(embedder);
        self
    }

    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Agent, AgentError> {
        let llm = self.llm.ok_or(AgentError::MissingComponent("LLM service"))?;
        let model = self.model.ok_or(AgentError::MissingComponent("LLM model"))?;
        let tools = self
            .tools
            .ok_or(AgentError::MissingComponent("tool registry"))?;
        let user_resolver = self
            .user_resolver
            .ok_or(AgentError::MissingComponent("user resolver"))?;
        let memory = self.memory.ok_or(AgentError::MissingComponent("agent memory"))?;
        let embedder = self
            .embedder
            .ok_or(AgentError::MissingComponent("embedding function"))?;

        tracing::info!(
            provider = llm.name(),
            model = %model,
            tools = tools.len(),
            memory_max_items = memory.max_items(),
            max_tool_iterations = self.config.max_tool_iterations,
            "agent assembled"
        );

        Ok(Agent {
            llm,
            model,
            tools: Arc::new(tools),
            user_resolver: Arc::new(user_resolver),
            memory,
            embedder,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use interlude_types::config::default_tool_grants;

    use crate::agent::tools::builtin_registry;
    use crate::agent::user::CookieUserResolver;
    use crate::llm::ScriptedProvider;
    use crate::memory::{HashEmbedder, InMemoryAgentMemory};

    fn full_builder() -> AgentBuilder {
        let embedder = Arc::new(BoxEmbedder::new(HashEmbedder::new(32)));
        let memory = Arc::new(BoxAgentMemory::new(InMemoryAgentMemory::new(
            Arc::clone(&embedder),
            1000,
        )));
        Agent::builder()
            .llm(Arc::new(BoxLlmProvider::new(ScriptedProvider::echo())), "qwen3-coder")
            .tool_registry(builtin_registry(&default_tool_grants(), None).unwrap())
            .user_resolver(BoxUserResolver::new(CookieUserResolver::default()))
            .memory(memory, embedder)
    }

    #[test]
    fn test_missing_component_is_reported() {
        let err = Agent::builder().build().err().unwrap();
        assert!(matches!(err, AgentError::MissingComponent("LLM service")));

        let err = Agent::builder()
            .llm(Arc::new(BoxLlmProvider::new(ScriptedProvider::echo())), "m")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, AgentError::MissingComponent("tool registry")));
    }

    #[test]
    fn test_default_config() {
        let agent = full_builder().build().unwrap();
        assert_eq!(agent.config().max_tool_iterations, 100);
        assert_eq!(agent.model(), "qwen3-coder");
    }

    #[tokio::test]
    async fn test_describe_splits_visible_and_hidden() {
        let agent = full_builder()
            .config(AgentConfig {
                max_tool_iterations: 7,
            })
            .build()
            .unwrap();
        let guest = agent.resolve_user(&RequestContext::default()).await;
        let inventory = agent.describe(&guest).await;
        assert_eq!(inventory.user.email, "guest@example.com");
        assert_eq!(inventory.hidden_tools, vec!["save_question_tool_args".to_string()]);
        assert_eq!(inventory.tools.len(), 3);
        assert_eq!(inventory.memory_max_items, 1000);
        assert_eq!(inventory.max_tool_iterations, 7);
        assert_eq!(inventory.provider, "scripted");
        assert_eq!(inventory.embedding_model, "local-hash");
    }

    #[tokio::test]
    async fn test_execute_tool_as_resolved_user() {
        let agent = full_builder().build().unwrap();
        let admin = agent
            .resolve_user(&RequestContext::from_cookie_header("vanna_email=admin@example.com"))
            .await;
        let guest = agent.resolve_user(&RequestContext::default()).await;
        let call = ToolCall::new(
            "save_question_tool_args",
            json!({"question": "q", "tool_name": "run_sql", "args": {"sql": "SELECT 1"}}),
        );

        let denied = agent.execute_tool(&guest, &call).await.unwrap_err();
        assert!(matches!(denied, ToolError::AccessDenied { .. }));

        agent.execute_tool(&admin, &call).await.unwrap();
        assert_eq!(agent.memory().len().await, 1);
    }
}
