//! Tool registry with per-tool access groups.
//!
//! Each registered tool carries the list of groups allowed to call it. An
//! empty list leaves the tool open to every user. Registration order is
//! preserved for listings.

use tracing::{Instrument, info_span};

use interlude_types::agent::{ToolCall, ToolResult, ToolSummary, User};
use interlude_types::error::ToolError;

use super::tool::{BoxTool, ToolContext};

struct RegisteredTool {
    tool: BoxTool,
    access_groups: Vec<String>,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool callable by members of `access_groups`.
    pub fn register(&mut self, tool: BoxTool, access_groups: Vec<String>) -> Result<(), ToolError> {
        if self.find(tool.name()).is_some() {
            return Err(ToolError::Duplicate(tool.name().to_string()));
        }
        tracing::debug!(tool = tool.name(), groups = ?access_groups, "tool registered");
        self.tools.push(RegisteredTool {
            tool,
            access_groups,
        });
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.tool.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&BoxTool> {
        self.find(name).map(|t| &t.tool)
    }

    pub fn access_groups(&self, name: &str) -> Option<&[String]> {
        self.find(name).map(|t| t.access_groups.as_slice())
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.tool.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn can_access(&self, user: &User, name: &str) -> bool {
        self.find(name)
            .is_some_and(|t| user.has_any_group(&t.access_groups))
    }

    /// Tools `user` may call, in registration order.
    pub fn tools_for(&self, user: &User) -> Vec<ToolSummary> {
        self.tools
            .iter()
            .filter(|t| user.has_any_group(&t.access_groups))
            .map(|t| ToolSummary {
                name: t.tool.name().to_string(),
                description: t.tool.description().to_string(),
                access_groups: t.access_groups.clone(),
                parameters: t.tool.parameters(),
            })
            .collect()
    }

    /// Run `call` on behalf of `ctx.user`, enforcing access groups.
    pub async fn execute(&self, ctx: &ToolContext, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let entry = self
            .find(&call.name)
            .ok_or_else(|| ToolError::NotFound(call.name.clone()))?;

        if !ctx.user.has_any_group(&entry.access_groups) {
            tracing::warn!(tool = %call.name, user = %ctx.user.email, "tool access denied");
            return Err(ToolError::AccessDenied {
                tool: call.name.clone(),
                user: ctx.user.email.clone(),
            });
        }

        let span = info_span!(
            "tool.execute",
            tool = %call.name,
            call_id = %call.id,
            user = %ctx.user.email,
            request_id = %ctx.request_id,
        );
        let result = entry
            .tool
            .execute(ctx, call.arguments.clone())
            .instrument(span)
            .await;
        match &result {
            Ok(r) => tracing::info!(tool = %call.name, success = r.success, "tool executed"),
            Err(e) => tracing::warn!(tool = %call.name, error = %e, "tool failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    use crate::agent::tool::Tool;
    use crate::memory::{BoxAgentMemory, BoxEmbedder, HashEmbedder, InMemoryAgentMemory};

    struct Ping;

    impl Tool for Ping {
        fn name(&self) -> &str {
            "ping"
        }

        fn description(&self) -> &str {
            "Replies pong"
        }

        fn parameters(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(
            &self,
            _ctx: &ToolContext,
            _args: serde_json::Value,
        ) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::ok("pong"))
        }
    }

    fn user(groups: &[&str]) -> User {
        User {
            id: "u".to_string(),
            email: "u@example.com".to_string(),
            group_memberships: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn ctx(user: User) -> ToolContext {
        let embedder = Arc::new(BoxEmbedder::new(HashEmbedder::new(8)));
        let memory = Arc::new(BoxAgentMemory::new(InMemoryAgentMemory::new(embedder, 10)));
        ToolContext::new(user, memory)
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(BoxTool::new(Ping), vec![]).unwrap();
        let err = registry.register(BoxTool::new(Ping), vec![]).unwrap_err();
        assert!(matches!(err, ToolError::Duplicate(name) if name == "ping"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_tools_for_filters_by_group() {
        let mut registry = ToolRegistry::new();
        registry
            .register(BoxTool::new(Ping), vec!["admin".to_string()])
            .unwrap();
        assert!(registry.tools_for(&user(&["user"])).is_empty());
        assert_eq!(registry.tools_for(&user(&["admin"])).len(), 1);
    }

    #[test]
    fn test_empty_groups_open_to_everyone() {
        let mut registry = ToolRegistry::new();
        registry.register(BoxTool::new(Ping), vec![]).unwrap();
        assert!(registry.can_access(&user(&[]), "ping"));
        let tools = registry.tools_for(&user(&["anyone"]));
        assert_eq!(tools[0].name, "ping");
        assert_eq!(tools[0].parameters["type"], "object");
    }

    #[tokio::test]
    async fn test_execute_enforces_access() {
        let mut registry = ToolRegistry::new();
        registry
            .register(BoxTool::new(Ping), vec!["admin".to_string()])
            .unwrap();
        let call = ToolCall::new("ping", json!({}));

        let denied = registry.execute(&ctx(user(&["user"])), &call).await.unwrap_err();
        assert!(matches!(denied, ToolError::AccessDenied { .. }));

        let ok = registry.execute(&ctx(user(&["admin"])), &call).await.unwrap();
        assert_eq!(ok.content, "pong");
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute(&ctx(user(&["admin"])), &ToolCall::new("nope", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }
}
