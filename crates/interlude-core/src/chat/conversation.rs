//! Two-state conversation machine.
//!
//! A `Conversation` owns its message history and a pause marker. It moves
//! `AwaitingInput -> Processing` when a turn begins and back to
//! `AwaitingInput` when the turn completes or is aborted. Completed turns
//! always leave the history alternating user/assistant.

use chrono::{DateTime, Utc};

use interlude_types::chat::{
    ChatMessage, ConversationId, ConversationSnapshot, ConversationStatus, MessageRole,
};
use interlude_types::error::ChatError;
use interlude_types::llm::Message;

#[derive(Debug, Clone)]
pub struct Conversation {
    id: ConversationId,
    status: ConversationStatus,
    messages: Vec<ChatMessage>,
    turn_count: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Conversation {
    /// A fresh conversation: empty history, awaiting input.
    pub fn new(id: ConversationId) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: ConversationStatus::AwaitingInput,
            messages: Vec::new(),
            turn_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of completed user/assistant exchanges.
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    /// Record the user message and enter `Processing`.
    ///
    /// Returns the full ordered history (new message included) to send to
    /// the LLM. Fails without mutating anything when a turn is already
    /// running.
    pub fn begin_turn(&mut self, user_text: &str) -> Result<Vec<Message>, ChatError> {
        if self.status == ConversationStatus::Processing {
            return Err(ChatError::TurnInProgress(self.id.clone()));
        }
        self.messages
            .push(ChatMessage::new(MessageRole::User, user_text));
        self.status = ConversationStatus::Processing;
        self.updated_at = Utc::now();
        Ok(self.history())
    }

    /// Record the assistant reply and return to `AwaitingInput`.
    pub fn complete_turn(&mut self, assistant_text: &str) -> Result<(), ChatError> {
        if self.status != ConversationStatus::Processing {
            return Err(ChatError::NoTurnInProgress(self.id.clone()));
        }
        self.messages
            .push(ChatMessage::new(MessageRole::Assistant, assistant_text));
        self.turn_count += 1;
        self.status = ConversationStatus::AwaitingInput;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Drop the pending user message and return to `AwaitingInput`.
    pub fn abort_turn(&mut self) -> Result<(), ChatError> {
        if self.status != ConversationStatus::Processing {
            return Err(ChatError::NoTurnInProgress(self.id.clone()));
        }
        if self
            .messages
            .last()
            .is_some_and(|m| m.role == MessageRole::User)
        {
            self.messages.pop();
        }
        self.status = ConversationStatus::AwaitingInput;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// History in LLM message form.
    pub fn history(&self) -> Vec<Message> {
        self.messages
            .iter()
            .map(|m| Message {
                role: m.role,
                content: m.content.clone(),
            })
            .collect()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            id: self.id.clone(),
            status: self.status,
            messages: self.messages.clone(),
            turn_count: self.turn_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
