//! Turn executor: resumes a paused conversation for exactly one turn.
//!
//! `advance` validates eagerly, records the user message, and hands back a
//! lazy fragment stream. The LLM call starts on first poll. The assistant
//! reply is committed only when the provider signals `Done`. An upstream
//! error, a stream that ends early, the deadline, or the consumer dropping
//! the stream all roll the user message back.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tracing::{debug, info, info_span, warn};

use interlude_types::chat::ConversationId;
use interlude_types::config::{LlmConfig, ServerConfig};
use interlude_types::error::ChatError;
use interlude_types::llm::{CompletionRequest, LlmError, Message, StreamEvent};

use crate::llm::BoxLlmProvider;

use super::store::ConversationStore;

/// Lazy, single-pass stream of reply fragments for one turn.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send + 'static>>;

/// Per-turn LLM request parameters.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub model: String,
    pub temperature: Option<f64>,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
    /// Deadline for the whole turn, measured from first poll.
    pub timeout: Duration,
}

impl TurnSettings {
    pub fn from_config(llm: &LlmConfig, server: &ServerConfig) -> Self {
        Self {
            model: llm.model.clone(),
            temperature: Some(llm.temperature),
            max_tokens: llm.max_tokens,
            system_prompt: llm.system_prompt.clone(),
            timeout: Duration::from_secs(server.turn_timeout_secs),
        }
    }
}

#[derive(Clone)]
pub struct TurnExecutor {
    store: ConversationStore,
    provider: Arc<BoxLlmProvider>,
    settings: Arc<TurnSettings>,
}

impl TurnExecutor {
    pub fn new(store: ConversationStore, provider: Arc<BoxLlmProvider>, settings: TurnSettings) -> Self {
        Self {
            store,
            provider,
            settings: Arc::new(settings),
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    /// Start one turn of conversation `id` with `user_text`.
    ///
    /// Fails before touching the conversation when the id is unknown, the
    /// text is blank, or a turn is already running.
    pub fn advance(&self, id: &ConversationId, user_text: &str) -> Result<FragmentStream, ChatError> {
        if !self.store.exists(id) {
            return Err(ChatError::UnknownConversation(id.clone()));
        }
        if user_text.trim().is_empty() {
            return Err(ChatError::MissingInput);
        }

        let history = self.store.begin_turn(id, user_text)?;
        let request = self.build_request(history);

        let span = info_span!(
            "gen_ai.chat",
            otel.name = %format!("chat {}", request.model),
            gen_ai.conversation.id = %id,
            gen_ai.operation.name = "chat",
            gen_ai.provider.name = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            history_len = request.messages.len(),
        );
        info!(thread_id = %id, history_len = request.messages.len(), "turn started");

        let mut guard = TurnGuard {
            store: self.store.clone(),
            id: id.clone(),
            finished: false,
        };
        let provider = Arc::clone(&self.provider);
        let timeout = self.settings.timeout;

        let stream = async_stream::stream! {
            let deadline = tokio::time::Instant::now() + timeout;
            let mut upstream = provider.stream(request);
            let mut reply = String::new();
            let mut fragments: u32 = 0;

            loop {
                let next = match tokio::time::timeout_at(deadline, upstream.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(timeout_secs = timeout.as_secs(), fragments, "turn deadline exceeded");
                        yield Err(ChatError::Timeout(timeout.as_secs()));
                        return;
                    }
                };

                match next {
                    Some(Ok(StreamEvent::TextDelta { text, .. })) => {
                        if text.is_empty() {
                            continue;
                        }
                        fragments += 1;
                        reply.push_str(&text);
                        yield Ok(text);
                    }
                    Some(Ok(StreamEvent::Usage(usage))) => {
                        debug!(
                            gen_ai.usage.input_tokens = usage.input_tokens,
                            gen_ai.usage.output_tokens = usage.output_tokens,
                            "token usage"
                        );
                    }
                    Some(Ok(StreamEvent::MessageDelta { stop_reason })) => {
                        debug!(gen_ai.response.finish_reasons = %stop_reason, "finish reason");
                    }
                    Some(Ok(StreamEvent::Done)) => break,
                    Some(Ok(_)) => {}
                    None => {
                        warn!(fragments, "upstream stream ended before completion");
                        yield Err(ChatError::Upstream(LlmError::Stream(
                            "reply ended before completion".to_string(),
                        )));
                        return;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, fragments, "upstream stream failed");
                        yield Err(ChatError::Upstream(e));
                        return;
                    }
                }
            }

            match guard.commit(&reply) {
                Ok(()) => info!(fragments, reply_len = reply.len(), "turn completed"),
                Err(e) => {
                    yield Err(e);
                }
            }
        };

        Ok(Box::pin(StreamInSpan {
            inner: Box::pin(stream),
            span,
        }))
    }

    fn build_request(&self, messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            system: self.settings.system_prompt.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            stream: true,
            stop_sequences: None,
        }
    }
}

/// Rolls the turn back on drop unless it was committed.
struct TurnGuard {
    store: ConversationStore,
    id: ConversationId,
    finished: bool,
}

impl TurnGuard {
    fn commit(&mut self, reply: &str) -> Result<(), ChatError> {
        self.finished = true;
        self.store.complete_turn(&self.id, reply)
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        match self.store.abort_turn(&self.id) {
            Ok(()) => info!(thread_id = %self.id, "turn aborted, user message rolled back"),
            Err(e) => debug!(thread_id = %self.id, error = %e, "nothing to roll back"),
        }
    }
}

/// Keeps the turn span entered while the fragment stream is polled.
struct StreamInSpan<T> {
    inner: Pin<Box<dyn Stream<Item = T> + Send + 'static>>,
    span: tracing::Span,
}

impl<T> Stream for StreamInSpan<T> {
    type Item = T;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let _enter = this.span.enter();
        this.inner.as_mut().poll_next(cx)
    }
}
