//! Tool trait and its object-safe wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use interlude_types::agent::{ToolResult, User};
use interlude_types::error::ToolError;

use crate::memory::BoxAgentMemory;

/// What a tool sees when it runs: who is calling, and the agent's memory.
#[derive(Clone)]
pub struct ToolContext {
    pub user: User,
    pub request_id: Uuid,
    pub memory: Arc<BoxAgentMemory>,
}

impl ToolContext {
    pub fn new(user: User, memory: Arc<BoxAgentMemory>) -> Self {
        Self {
            user,
            request_id: Uuid::now_v7(),
            memory,
        }
    }
}

/// A callable tool exposed to the LLM.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the arguments object.
    fn parameters(&self) -> serde_json::Value;

    fn execute(
        &self,
        ctx: &ToolContext,
        args: serde_json::Value,
    ) -> impl Future<Output = Result<ToolResult, ToolError>> + Send;
}

/// Object-safe version of [`Tool`].
pub trait ToolDyn: Send + Sync {
    fn name_dyn(&self) -> &str;

    fn description_dyn(&self) -> &str;

    fn parameters_dyn(&self) -> serde_json::Value;

    fn execute_boxed<'a>(
        &'a self,
        ctx: &'a ToolContext,
        args: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send + 'a>>;
}

impl<T: Tool> ToolDyn for T {
    fn name_dyn(&self) -> &str {
        self.name()
    }

    fn description_dyn(&self) -> &str {
        self.description()
    }

    fn parameters_dyn(&self) -> serde_json::Value {
        self.parameters()
    }

    fn execute_boxed<'a>(
        &'a self,
        ctx: &'a ToolContext,
        args: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<ToolResult, ToolError>> + Send + 'a>> {
        Box::pin(self.execute(ctx, args))
    }
}

pub struct BoxTool {
    inner: Box<dyn ToolDyn + Send + Sync>,
}

impl BoxTool {
    pub fn new<T: Tool + 'static>(tool: T) -> Self {
        Self {
            inner: Box::new(tool),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name_dyn()
    }

    pub fn description(&self) -> &str {
        self.inner.description_dyn()
    }

    pub fn parameters(&self) -> serde_json::Value {
        self.inner.parameters_dyn()
    }

    pub async fn execute(
        &self,
        ctx: &ToolContext,
        args: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        self.inner.execute_boxed(ctx, args).await
    }
}

/// JSON Schema for an arguments struct.
pub fn schema_of<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default()
}

/// Deserialize tool arguments, mapping failures to `InvalidArguments`.
pub fn parse_args<T: DeserializeOwned>(args: serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}
