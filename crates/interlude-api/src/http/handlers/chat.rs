//! SSE chat endpoint.
//!
//! POST /chat/{thread_id}
//!
//! Body: `{ "messages": [ { "content": "..." }, ... ] }`. Only the last
//! entry's `content` is used; any other field is ignored.
//!
//! SSE event types:
//! - `message`: one text fragment, raw
//! - `error`: `{ "code": "...", "message": "..." }`, at most once
//! - `done`: `{}`, always last

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use tokio_stream::Stream;

use interlude_types::chat::ConversationId;

use crate::http::error::{AppError, chat_error_code, error_body};
use crate::state::AppState;

/// Content of the last entry of `messages`, if it is a string.
///
/// Anything that is not JSON, has no `messages` array, has an empty array,
/// or whose last entry lacks a string `content` yields `None`.
pub fn last_message_content(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("messages")?
        .as_array()?
        .last()?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

/// SSE data lines cannot carry a bare carriage return.
fn sse_data(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_string()
    }
}

/// POST /chat/{thread_id}
///
/// Validation errors (unknown thread, missing input, turn already running)
/// are plain JSON responses. Once the stream has started, failures arrive
/// as an `error` event.
pub async fn chat(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
    body: Bytes,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let id = ConversationId::from(thread_id);
    // A missing message becomes "", which `advance` rejects after the
    // unknown-thread check.
    let user_text = last_message_content(&body).unwrap_or_default();

    let mut fragments = state.executor.advance(&id, &user_text)?;

    let sse_stream = async_stream::stream! {
        while let Some(item) = fragments.next().await {
            match item {
                Ok(fragment) => {
                    yield Ok::<_, Infallible>(Event::default().event("message").data(sse_data(&fragment)));
                }
                Err(e) => {
                    let (code, _) = chat_error_code(&e);
                    let data = error_body(code, &e.to_string())["error"].to_string();
                    yield Ok(Event::default().event("error").data(data));
                    break;
                }
            }
        }
        yield Ok(Event::default().event("done").data("{}"));
    };

    Ok(Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(state.keep_alive)))
}
