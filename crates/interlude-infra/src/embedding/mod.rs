//! Embedding function implementations.
//!
//! [`OpenAiEmbedder`] calls an OpenAI-compatible `/embeddings` endpoint.
//! When no endpoint is configured, agent assembly falls back to the local
//! `HashEmbedder` from `interlude-core`.

pub mod openai;

pub use openai::OpenAiEmbedder;
