//! HTTP layer for the chat-turn service.
//!
//! Axum routes for starting conversations and streaming turns over SSE,
//! with permissive CORS and request tracing.

pub mod error;
pub mod handlers;
pub mod router;
