//! OpenAI SSE stream to [`StreamEvent`] adapter.
//!
//! async-openai ends its chunk stream quietly when the server closes the
//! connection, with or without `[DONE]`. A reply is only complete once some
//! choice has carried a `finish_reason`; anything shorter is surfaced as
//! [`LlmError::Stream`].

use futures_util::StreamExt;

use async_openai::types::chat::{ChatCompletionResponseStream, FinishReason};

use interlude_core::llm::provider::LlmEventStream;
use interlude_types::llm::{LlmError, StopReason, StreamEvent, Usage};

pub(crate) fn stop_reason(finish_reason: &FinishReason) -> StopReason {
    match finish_reason {
        FinishReason::Stop => StopReason::EndTurn,
        FinishReason::Length => StopReason::MaxTokens,
        FinishReason::ToolCalls | FinishReason::FunctionCall => StopReason::ToolUse,
        FinishReason::ContentFilter => StopReason::ContentFilter,
    }
}

/// Map an async-openai [`ChatCompletionResponseStream`] to [`StreamEvent`]s.
///
/// Emits `Connected`, `TextDelta`s as content arrives, a `MessageDelta` per
/// finish reason, `Usage` when the server reports it, and `Done` once the
/// upstream ends after a finish reason.
pub fn map_openai_stream(stream: ChatCompletionResponseStream) -> LlmEventStream {
    Box::pin(async_stream::try_stream! {
        yield StreamEvent::Connected;

        let mut stream = stream;
        let mut finished = false;

        while let Some(result) = stream.next().await {
            let chunk = result.map_err(|e| LlmError::Stream(e.to_string()))?;

            // Usage arrives on a trailing chunk with no choices.
            if let Some(usage) = &chunk.usage {
                yield StreamEvent::Usage(Usage {
                    input_tokens: usage.prompt_tokens,
                    output_tokens: usage.completion_tokens,
                });
            }

            for choice in &chunk.choices {
                if let Some(text) = &choice.delta.content
                    && !text.is_empty()
                {
                    yield StreamEvent::TextDelta {
                        index: choice.index,
                        text: text.clone(),
                    };
                }

                if let Some(finish_reason) = &choice.finish_reason {
                    finished = true;
                    yield StreamEvent::MessageDelta {
                        stop_reason: stop_reason(finish_reason),
                    };
                }
            }
        }

        if !finished {
            Err::<(), _>(LlmError::Stream("stream ended before finish_reason".to_string()))?;
        }

        yield StreamEvent::Done;
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_reason_mapping() {
        let cases = [
            (FinishReason::Stop, StopReason::EndTurn),
            (FinishReason::Length, StopReason::MaxTokens),
            (FinishReason::ToolCalls, StopReason::ToolUse),
            (FinishReason::ContentFilter, StopReason::ContentFilter),
            (FinishReason::FunctionCall, StopReason::ToolUse),
        ];
        for (finish, expected) in cases {
            assert_eq!(stop_reason(&finish), expected);
        }
    }
}
