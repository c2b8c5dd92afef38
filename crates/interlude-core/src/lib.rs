//! Business logic and port traits for Interlude.
//!
//! This crate owns the conversation state machine and the turn executor,
//! plus the agent's traits (LLM provider, embedder, memory, SQL runner,
//! user resolver, tools). It depends only on `interlude-types` -- never on
//! `interlude-infra` or any network/database crate.

pub mod agent;
pub mod chat;
pub mod llm;
pub mod memory;
