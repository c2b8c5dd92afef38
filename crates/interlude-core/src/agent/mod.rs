//! Data agent assembly.
//!
//! The agent is a bundle of collaborators behind traits: an LLM provider,
//! a tool registry with per-tool access groups, a user resolver, and
//! vector memory. `AgentBuilder` wires them together and validates that
//! nothing is missing.

pub mod builder;
pub mod registry;
pub mod sql;
pub mod tool;
pub mod tools;
pub mod user;

pub use builder::{Agent, AgentBuilder};
pub use registry::ToolRegistry;
pub use sql::{BoxSqlRunner, SqlRunner, SqlRunnerDyn};
pub use tool::{BoxTool, Tool, ToolContext, ToolDyn};
pub use user::{BoxUserResolver, CookieUserResolver, UserResolver, UserResolverDyn};
