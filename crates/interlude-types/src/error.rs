use thiserror::Error;

use crate::chat::ConversationId;
use crate::llm::LlmError;

/// Errors surfaced by the chat-turn service.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("unknown conversation '{0}'")]
    UnknownConversation(ConversationId),

    #[error("no user message provided")]
    MissingInput,

    #[error("a turn is already running for conversation '{0}'")]
    TurnInProgress(ConversationId),

    #[error("conversation '{0}' has no turn in progress")]
    NoTurnInProgress(ConversationId),

    #[error("upstream LLM failure: {0}")]
    Upstream(#[from] LlmError),

    #[error("turn timed out after {0}s")]
    Timeout(u64),
}

/// Errors from the agent's vector memory and embedding function.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from the SQL runner behind the `run_sql` tool.
#[derive(Debug, Error)]
pub enum SqlError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),
}

/// Errors from tool registration and execution.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool '{0}' not found")]
    NotFound(String),

    #[error("tool '{0}' is already registered")]
    Duplicate(String),

    #[error("user '{user}' may not call tool '{tool}'")]
    AccessDenied { tool: String, user: String },

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("execution failed: {0}")]
    Execution(String),

    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Sql(#[from] SqlError),
}

/// Errors raised while assembling an agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent is missing its {0}")]
    MissingComponent(&'static str),

    #[error("unknown tool in configuration: '{0}'")]
    UnknownTool(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Sql(#[from] SqlError),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
