//! Agent memory: embedding functions and the bounded vector store.
//!
//! - `Embedder` / `BoxEmbedder`: text-to-vector conversion
//! - `AgentMemory` / `BoxAgentMemory`: save and search memory items
//! - `InMemoryAgentMemory`: bounded in-process implementation
//! - `HashEmbedder`: deterministic local embedder

pub mod agent_memory;
pub mod box_embedder;
pub mod embedder;
pub mod hash_embedder;
pub mod in_memory;

pub use agent_memory::{AgentMemory, AgentMemoryDyn, BoxAgentMemory, MemoryQuery};
pub use box_embedder::{BoxEmbedder, EmbedderDyn};
pub use embedder::Embedder;
pub use hash_embedder::HashEmbedder;
pub use in_memory::InMemoryAgentMemory;
