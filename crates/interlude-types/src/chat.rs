//! Conversation and message types for the chat-turn service.
//!
//! A conversation is an ordered history of user/assistant messages plus a
//! pause marker. It sits in [`ConversationStatus::AwaitingInput`] between
//! turns and in [`ConversationStatus::Processing`] while a turn runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// Opaque identifier of a single conversation (the HTTP `thread_id`).
///
/// Fresh identifiers are random v4 UUIDs, but any string is accepted when
/// parsing so that unknown tokens resolve to "not found" rather than a
/// format error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Generate a fresh, random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ConversationId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Pause marker of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    /// Suspended, waiting for the next user message.
    AwaitingInput,
    /// A turn is running: the user message is recorded and the LLM reply
    /// has not been committed yet.
    Processing,
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStatus::AwaitingInput => write!(f, "awaiting_input"),
            ConversationStatus::Processing => write!(f, "processing"),
        }
    }
}

impl FromStr for ConversationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "awaiting_input" => Ok(ConversationStatus::AwaitingInput),
            "processing" => Ok(ConversationStatus::Processing),
            other => Err(format!("invalid conversation status: '{other}'")),
        }
    }
}

impl Default for ConversationStatus {
    fn default() -> Self {
        ConversationStatus::AwaitingInput
    }
}

/// A single entry in a conversation history. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Read-only copy of a conversation, safe to hand out across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub id: ConversationId,
    pub status: ConversationStatus,
    pub messages: Vec<ChatMessage>,
    pub turn_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
