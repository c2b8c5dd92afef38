//! Deterministic LLM provider that replays scripted replies.
//!
//! Each call to `stream`/`complete` consumes the next [`ScriptedReply`];
//! once the script is exhausted the last reply repeats. Every request is
//! recorded so tests can assert on the history that was sent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use interlude_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, ProviderCapabilities,
    StopReason, StreamEvent, Usage,
};

use super::provider::{LlmEventStream, LlmProvider};

/// One canned reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Stream these fragments, then finish normally.
    Fragments(Vec<String>),
    /// Stream these fragments, then fail with a provider error.
    FailAfter { fragments: Vec<String>, message: String },
    /// Stream these fragments, then never finish.
    Stall(Vec<String>),
    /// Stream these fragments, then end without a finish reason or `Done`,
    /// like a connection closed mid-reply.
    Cut(Vec<String>),
    /// Reply with `echo: <last user message>`, split on whitespace.
    Echo,
}

impl ScriptedReply {
    pub fn text(fragments: &[&str]) -> Self {
        ScriptedReply::Fragments(fragments.iter().map(|f| f.to_string()).collect())
    }
}

pub struct ScriptedProvider {
    replies: Vec<ScriptedReply>,
    calls: AtomicUsize,
    fragment_delay: Option<Duration>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    capabilities: ProviderCapabilities,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies,
            calls: AtomicUsize::new(0),
            fragment_delay: None,
            requests: Arc::new(Mutex::new(Vec::new())),
            capabilities: ProviderCapabilities::default(),
        }
    }

    /// A provider that echoes the last user message on every call.
    pub fn echo() -> Self {
        Self::new(vec![ScriptedReply::Echo])
    }

    /// Sleep between fragments.
    pub fn with_fragment_delay(mut self, delay: Duration) -> Self {
        self.fragment_delay = Some(delay);
        self
    }

    /// Shared handle to the recorded requests, usable after the provider
    /// has been boxed.
    pub fn request_log(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }

    fn next_reply(&self, request: &CompletionRequest) -> ScriptedReply {
        if let Ok(mut log) = self.requests.lock() {
            log.push(request.clone());
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .get(n)
            .or_else(|| self.replies.last())
            .cloned()
            .unwrap_or(ScriptedReply::Echo);
        match reply {
            ScriptedReply::Echo => {
                let last = request
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == MessageRole::User)
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                let text = format!("echo: {last}");
                let mut fragments = Vec::new();
                let mut rest = text.as_str();
                while let Some(pos) = rest[1..].find(' ').map(|p| p + 1) {
                    fragments.push(rest[..pos].to_string());
                    rest = &rest[pos..];
                }
                fragments.push(rest.to_string());
                ScriptedReply::Fragments(fragments)
            }
            other => other,
        }
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        match self.next_reply(request) {
            ScriptedReply::Fragments(fragments) | ScriptedReply::Stall(fragments) => {
                Ok(CompletionResponse {
                    id: format!("scripted-{}", self.calls.load(Ordering::SeqCst)),
                    content: fragments.concat(),
                    model: request.model.clone(),
                    stop_reason: StopReason::EndTurn,
                    usage: Usage::default(),
                })
            }
            ScriptedReply::FailAfter { message, .. } => Err(LlmError::Provider { message }),
            ScriptedReply::Cut(_) => Err(LlmError::Stream("connection closed".to_string())),
            ScriptedReply::Echo => Err(LlmError::InvalidRequest(
                "echo reply was not expanded".to_string(),
            )),
        }
    }

    fn stream(&self, request: CompletionRequest) -> LlmEventStream {
        let reply = self.next_reply(&request);
        let delay = self.fragment_delay;

        Box::pin(async_stream::stream! {
            yield Ok(StreamEvent::Connected);

            let (fragments, failure, stall, cut) = match reply {
                ScriptedReply::Fragments(f) => (f, None, false, false),
                ScriptedReply::FailAfter { fragments, message } => {
                    (fragments, Some(message), false, false)
                }
                ScriptedReply::Stall(f) => (f, None, true, false),
                ScriptedReply::Cut(f) => (f, None, false, true),
                ScriptedReply::Echo => (Vec::new(), None, false, false),
            };

            for text in fragments {
                if let Some(d) = delay {
                    tokio::time::sleep(d).await;
                }
                yield Ok(StreamEvent::TextDelta { index: 0, text });
            }

            if let Some(message) = failure {
                yield Err(LlmError::Provider { message });
                return;
            }
            if stall {
                futures_util::future::pending::<()>().await;
            }
            if cut {
                return;
            }

            yield Ok(StreamEvent::MessageDelta { stop_reason: StopReason::EndTurn });
            yield Ok(StreamEvent::Done);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use interlude_types::llm::Message;

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest {
            model: "test".to_string(),
            messages: vec![Message::user(text)],
            system: None,
            max_tokens: 64,
            temperature: Some(0.0),
            stream: true,
            stop_sequences: None,
        }
    }

    async fn collect_text(provider: &ScriptedProvider, text: &str) -> String {
        let mut out = String::new();
        let mut stream = provider.stream(request(text));
        while let Some(event) = stream.next().await {
            if let Ok(StreamEvent::TextDelta { text, .. }) = event {
                out.push_str(&text);
            }
        }
        out
    }

    #[tokio::test]
    async fn test_replies_in_order_then_repeat_last() {
        let provider = ScriptedProvider::new(vec![
            ScriptedReply::text(&["a", "b"]),
            ScriptedReply::text(&["c"]),
        ]);
        assert_eq!(collect_text(&provider, "x").await, "ab");
        assert_eq!(collect_text(&provider, "x").await, "c");
        assert_eq!(collect_text(&provider, "x").await, "c");
    }

    #[tokio::test]
    async fn test_echo_splits_on_words() {
        let provider = ScriptedProvider::echo();
        let mut stream = provider.stream(request("hello there"));
        let mut fragments = Vec::new();
        while let Some(Ok(event)) = stream.next().await {
            if let StreamEvent::TextDelta { text, .. } = event {
                fragments.push(text);
            }
        }
        assert_eq!(fragments, vec!["echo:", " hello", " there"]);
    }

    #[tokio::test]
    async fn test_fail_after_yields_error_last() {
        let provider = ScriptedProvider::new(vec![ScriptedReply::FailAfter {
            fragments: vec!["par".to_string()],
            message: "boom".to_string(),
        }]);
        let events: Vec<_> = provider.stream(request("x")).collect().await;
        assert!(matches!(events.last(), Some(Err(LlmError::Provider { .. }))));
        assert_eq!(events.len(), 3);
    }

    #[tokio::test]
    async fn test_cut_ends_without_done() {
        let provider = ScriptedProvider::new(vec![ScriptedReply::Cut(vec!["par".to_string()])]);
        let events: Vec<_> = provider.stream(request("x")).collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events.last(), Some(Ok(StreamEvent::TextDelta { .. }))));
    }

    #[tokio::test]
    async fn test_requests_are_recorded() {
        let provider = ScriptedProvider::echo();
        let log = provider.request_log();
        let response = provider.complete(&request("ping")).await.unwrap();
        assert_eq!(response.content, "echo: ping");
        assert_eq!(log.lock().unwrap().len(), 1);
    }
}
