//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! The chat-turn span in `interlude-core` records these as literal field
//! names (tracing macros need identifiers); the constants here are the
//! reference list and are used where names are built at runtime.
//!
//! Span naming convention: `"{operation} {model}"` (e.g. `"chat gpt-4o-mini"`).

pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";
pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";
pub const GEN_AI_REQUEST_MAX_TOKENS: &str = "gen_ai.request.max_tokens";
pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";
pub const GEN_AI_RESPONSE_FINISH_REASONS: &str = "gen_ai.response.finish_reasons";

/// Conversation (thread) identifier.
pub const GEN_AI_CONVERSATION_ID: &str = "gen_ai.conversation.id";

// --- Operation name values ---

/// One chat turn.
pub const OP_CHAT: &str = "chat";

/// Agent assembly and inspection.
pub const OP_INVOKE_AGENT: &str = "invoke_agent";

/// Tool execution on behalf of a user.
pub const OP_EXECUTE_TOOL: &str = "execute_tool";

/// Span name for `operation` against `model`.
pub fn span_name(operation: &str, model: &str) -> String {
    if model.is_empty() {
        operation.to_string()
    } else {
        format!("{operation} {model}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_name() {
        assert_eq!(span_name(OP_CHAT, "gpt-4o-mini"), "chat gpt-4o-mini");
        assert_eq!(span_name(OP_INVOKE_AGENT, ""), "invoke_agent");
    }

    #[test]
    fn test_attribute_namespace() {
        for name in [
            GEN_AI_OPERATION_NAME,
            GEN_AI_PROVIDER_NAME,
            GEN_AI_REQUEST_MODEL,
            GEN_AI_REQUEST_TEMPERATURE,
            GEN_AI_REQUEST_MAX_TOKENS,
            GEN_AI_USAGE_INPUT_TOKENS,
            GEN_AI_USAGE_OUTPUT_TOKENS,
            GEN_AI_RESPONSE_FINISH_REASONS,
            GEN_AI_CONVERSATION_ID,
        ] {
            assert!(name.starts_with("gen_ai."));
        }
    }
}
