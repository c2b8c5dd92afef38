//! Infrastructure layer for Interlude.
//!
//! Contains implementations of the traits defined in `interlude-core`:
//! the OpenAI-compatible LLM provider, the OpenAI-compatible embeddings
//! client, the MySQL runner, plus configuration loading and the agent
//! assembly that wires them together.

pub mod agent;
pub mod config;
pub mod embedding;
pub mod llm;
pub mod sql;
