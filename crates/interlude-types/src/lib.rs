//! Shared domain types for Interlude.
//!
//! This crate contains the core domain types used across the workspace:
//! conversations and their messages, LLM request/stream shapes, agent
//! users and tool calls, configuration, and the associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
