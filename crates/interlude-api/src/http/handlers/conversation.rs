//! Conversation lifecycle endpoints.
//!
//! - `POST /start` creates a conversation and returns its `thread_id`
//! - `GET /chat/{thread_id}` returns the history and status

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use interlude_types::chat::{ConversationId, ConversationSnapshot};
use interlude_types::error::ChatError;

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub thread_id: ConversationId,
}

/// POST /start
pub async fn start(State(state): State<AppState>) -> Json<StartResponse> {
    let thread_id = state.store().create();
    tracing::info!(%thread_id, "conversation started");
    Json(StartResponse { thread_id })
}

/// GET /chat/{thread_id}
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> Result<Json<ConversationSnapshot>, AppError> {
    let id = ConversationId::from(thread_id);
    state
        .store()
        .snapshot(&id)
        .map(Json)
        .ok_or(AppError::Chat(ChatError::UnknownConversation(id)))
}
