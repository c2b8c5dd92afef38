//! Application error type mapping to HTTP status codes.
//!
//! Every error body has the shape
//! `{ "error": { "code": "...", "message": "..." } }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use interlude_types::error::ChatError;

#[derive(Debug)]
pub enum AppError {
    Chat(ChatError),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    /// Machine-readable code and HTTP status for this error.
    pub fn code_and_status(&self) -> (&'static str, StatusCode) {
        match self {
            AppError::Chat(e) => chat_error_code(e),
        }
    }
}

/// Code and status for a [`ChatError`]; shared with the SSE `error` event.
pub fn chat_error_code(err: &ChatError) -> (&'static str, StatusCode) {
    match err {
        ChatError::UnknownConversation(_) => ("UNKNOWN_CONVERSATION", StatusCode::NOT_FOUND),
        ChatError::MissingInput => ("MISSING_INPUT", StatusCode::BAD_REQUEST),
        ChatError::TurnInProgress(_) => ("TURN_IN_PROGRESS", StatusCode::CONFLICT),
        ChatError::NoTurnInProgress(_) => ("NO_TURN_IN_PROGRESS", StatusCode::CONFLICT),
        ChatError::Upstream(_) => ("UPSTREAM_FAILURE", StatusCode::BAD_GATEWAY),
        ChatError::Timeout(_) => ("TIMEOUT", StatusCode::GATEWAY_TIMEOUT),
    }
}

/// The `{ "error": { code, message } }` body.
pub fn error_body(code: &str, message: &str) -> serde_json::Value {
    json!({ "error": { "code": code, "message": message } })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, status) = self.code_and_status();
        let message = match &self {
            AppError::Chat(e) => e.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        }
        (status, Json(error_body(code, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlude_types::chat::ConversationId;
    use interlude_types::llm::LlmError;

    #[test]
    fn test_status_mapping() {
        let id = ConversationId::from("t1");
        let cases = [
            (ChatError::UnknownConversation(id.clone()), StatusCode::NOT_FOUND),
            (ChatError::MissingInput, StatusCode::BAD_REQUEST),
            (ChatError::TurnInProgress(id), StatusCode::CONFLICT),
            (
                ChatError::Upstream(LlmError::AuthenticationFailed),
                StatusCode::BAD_GATEWAY,
            ),
            (ChatError::Timeout(5), StatusCode::GATEWAY_TIMEOUT),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError::from(err).code_and_status().1, expected);
        }
    }

    #[test]
    fn test_error_body_shape() {
        let body = error_body("MISSING_INPUT", "no user message provided");
        assert_eq!(body["error"]["code"], "MISSING_INPUT");
        assert_eq!(body["error"]["message"], "no user message provided");
    }
}
