//! LLM provider abstractions for Interlude.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: object-safe wrapper for dynamic dispatch
//! - `ScriptedProvider`: deterministic provider replaying canned fragments

pub mod box_provider;
pub mod provider;
pub mod scripted;

pub use box_provider::{BoxLlmProvider, LlmProviderDyn};
pub use provider::LlmProvider;
pub use scripted::ScriptedProvider;
