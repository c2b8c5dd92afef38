//! Chat-turn service: conversation state, store and turn execution.

pub mod conversation;
pub mod executor;
pub mod store;

pub use conversation::Conversation;
pub use executor::{FragmentStream, TurnExecutor, TurnSettings};
pub use store::ConversationStore;
