//! In-process conversation store.
//!
//! Owned by the application state and shared by clone. Every state
//! transition runs under the owning shard's write lock, so concurrent
//! requests against one conversation observe the transitions atomically.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use interlude_types::chat::{ConversationId, ConversationSnapshot};
use interlude_types::error::ChatError;
use interlude_types::llm::Message;

use super::conversation::Conversation;

#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    conversations: Arc<DashMap<ConversationId, Conversation>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty conversation awaiting input and return its id.
    ///
    /// The id is never one this store has handed out before.
    pub fn create(&self) -> ConversationId {
        loop {
            let id = ConversationId::new();
            if let Entry::Vacant(slot) = self.conversations.entry(id.clone()) {
                slot.insert(Conversation::new(id.clone()));
                tracing::debug!(thread_id = %id, "conversation created");
                return id;
            }
        }
    }

    pub fn exists(&self, id: &ConversationId) -> bool {
        self.conversations.contains_key(id)
    }

    pub fn snapshot(&self, id: &ConversationId) -> Option<ConversationSnapshot> {
        self.conversations.get(id).map(|c| c.snapshot())
    }

    pub fn begin_turn(&self, id: &ConversationId, user_text: &str) -> Result<Vec<Message>, ChatError> {
        let mut conversation = self
            .conversations
            .get_mut(id)
            .ok_or_else(|| ChatError::UnknownConversation(id.clone()))?;
        conversation.begin_turn(user_text)
    }

    pub fn complete_turn(&self, id: &ConversationId, assistant_text: &str) -> Result<(), ChatError> {
        let mut conversation = self
            .conversations
            .get_mut(id)
            .ok_or_else(|| ChatError::UnknownConversation(id.clone()))?;
        conversation.complete_turn(assistant_text)
    }

    pub fn abort_turn(&self, id: &ConversationId) -> Result<(), ChatError> {
        let mut conversation = self
            .conversations
            .get_mut(id)
            .ok_or_else(|| ChatError::UnknownConversation(id.clone()))?;
        conversation.abort_turn()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Drop every conversation. Called on shutdown.
    pub fn clear(&self) {
        let count = self.conversations.len();
        self.conversations.clear();
        tracing::info!(count, "conversation store cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use interlude_types::chat::ConversationStatus;

    #[test]
    fn test_create_returns_fresh_ids() {
        let store = ConversationStore::new();
        let ids: HashSet<_> = (0..500).map(|_| store.create()).collect();
        assert_eq!(ids.len(), 500);
        assert_eq!(store.len(), 500);
    }

    #[test]
    fn test_created_conversation_is_empty_and_awaiting() {
        let store = ConversationStore::new();
        let id = store.create();
        assert!(store.exists(&id));
        let snap = store.snapshot(&id).unwrap();
        assert_eq!(snap.status, ConversationStatus::AwaitingInput);
        assert!(snap.messages.is_empty());
    }

    #[test]
    fn test_unknown_id_is_rejected_without_mutation() {
        let store = ConversationStore::new();
        let known = store.create();
        let unknown = ConversationId::from("nope");
        assert!(!store.exists(&unknown));
        assert!(store.snapshot(&unknown).is_none());
        assert!(matches!(
            store.begin_turn(&unknown, "hi"),
            Err(ChatError::UnknownConversation(_))
        ));
        assert_eq!(store.len(), 1);
        assert!(store.snapshot(&known).unwrap().messages.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let store = ConversationStore::new();
        let other = store.clone();
        let id = store.create();
        assert!(other.exists(&id));
        other.begin_turn(&id, "hello").unwrap();
        assert_eq!(
            store.snapshot(&id).unwrap().status,
            ConversationStatus::Processing
        );
    }

    #[test]
    fn test_clear_empties_store() {
        let store = ConversationStore::new();
        store.create();
        store.create();
        store.clear();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_begin_turn_admits_exactly_one() {
        let store = ConversationStore::new();
        let id = store.create();
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                store.begin_turn(&id, &format!("m{i}")).is_ok()
            }));
        }
        let mut admitted = 0;
        for h in handles {
            if h.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(store.snapshot(&id).unwrap().messages.len(), 1);
    }
}
