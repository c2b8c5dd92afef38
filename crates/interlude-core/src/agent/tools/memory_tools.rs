//! Tools that read and write agent memory.
//!
//! - `save_question_tool_args`: remember a question and the tool call that
//!   answered it correctly
//! - `search_saved_correct_tool_uses`: find remembered tool calls for
//!   similar questions
//! - `save_text_memory`: remember a free-form note

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use interlude_types::agent::{MemoryItem, MemoryKind, ToolResult};
use interlude_types::error::ToolError;

use crate::agent::tool::{Tool, ToolContext, parse_args, schema_of};
use crate::memory::MemoryQuery;

pub const SAVE_QUESTION_TOOL_ARGS: &str = "save_question_tool_args";
pub const SEARCH_SAVED_CORRECT_TOOL_USES: &str = "search_saved_correct_tool_uses";
pub const SAVE_TEXT_MEMORY: &str = "save_text_memory";

const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveQuestionToolArgs {
    /// The user question that was answered.
    pub question: String,
    /// Name of the tool that answered it.
    pub tool_name: String,
    /// The exact arguments passed to that tool.
    pub args: serde_json::Value,
}

pub struct SaveQuestionToolArgsTool;

impl Tool for SaveQuestionToolArgsTool {
    fn name(&self) -> &str {
        SAVE_QUESTION_TOOL_ARGS
    }

    fn description(&self) -> &str {
        "Save a question together with the tool call that answered it correctly, \
         so it can be reused for similar questions."
    }

    fn parameters(&self) -> serde_json::Value {
        schema_of::<SaveQuestionToolArgs>()
    }

    async fn execute(&self, ctx: &ToolContext, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: SaveQuestionToolArgs = parse_args(args)?;
        if args.question.trim().is_empty() || args.tool_name.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "question and tool_name must not be empty".to_string(),
            ));
        }
        let item = MemoryItem::tool_usage(
            args.question.trim(),
            args.tool_name.trim(),
            args.args,
            ctx.user.email.clone(),
        );
        let id = item.id;
        ctx.memory.save(item).await?;
        Ok(ToolResult::ok(format!(
            "Saved tool usage for question: {}",
            args.question.trim()
        ))
        .with_data(json!({ "id": id })))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchSavedCorrectToolUsesArgs {
    /// The question to find similar saved tool usages for.
    pub question: String,
    /// Maximum number of results.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Minimum cosine similarity, between 0 and 1.
    #[serde(default)]
    pub similarity_threshold: Option<f32>,
}

pub struct SearchSavedCorrectToolUsesTool;

impl Tool for SearchSavedCorrectToolUsesTool {
    fn name(&self) -> &str {
        SEARCH_SAVED_CORRECT_TOOL_USES
    }

    fn description(&self) -> &str {
        "Search saved correct tool usages for questions similar to the given one."
    }

    fn parameters(&self) -> serde_json::Value {
        schema_of::<SearchSavedCorrectToolUsesArgs>()
    }

    async fn execute(&self, ctx: &ToolContext, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: SearchSavedCorrectToolUsesArgs = parse_args(args)?;
        let query = MemoryQuery::new(args.question)
            .kind(MemoryKind::ToolUsage)
            .limit(args.limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
            .min_similarity(args.similarity_threshold.unwrap_or(DEFAULT_SIMILARITY_THRESHOLD));
        let results = ctx.memory.search(&query).await?;

        if results.is_empty() {
            return Ok(ToolResult::ok("No similar tool usages found."));
        }

        let mut content = format!("Found {} similar tool usage(s):", results.len());
        for r in &results {
            content.push_str(&format!(
                "\n{}. [{:.2}] {} -> {} {}",
                r.rank,
                r.similarity,
                r.item.content,
                r.item.tool_name.as_deref().unwrap_or("?"),
                r.item
                    .tool_args
                    .as_ref()
                    .map(|a| a.to_string())
                    .unwrap_or_default(),
            ));
        }
        let data = serde_json::to_value(&results).map_err(|e| ToolError::Execution(e.to_string()))?;
        Ok(ToolResult::ok(content).with_data(data))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveTextMemoryArgs {
    /// The text to remember.
    pub content: String,
}

pub struct SaveTextMemoryTool;

impl Tool for SaveTextMemoryTool {
    fn name(&self) -> &str {
        SAVE_TEXT_MEMORY
    }

    fn description(&self) -> &str {
        "Save a free-form note (schema hints, business rules, user preferences) to memory."
    }

    fn parameters(&self) -> serde_json::Value {
        schema_of::<SaveTextMemoryArgs>()
    }

    async fn execute(&self, ctx: &ToolContext, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: SaveTextMemoryArgs = parse_args(args)?;
        let content = args.content.trim();
        if content.is_empty() {
            return Err(ToolError::InvalidArguments("content must not be empty".to_string()));
        }
        let item = MemoryItem::text(content, ctx.user.email.clone());
        let id = item.id;
        ctx.memory.save(item).await?;
        Ok(ToolResult::ok("Saved text memory.").with_data(json!({ "id": id })))
    }
}
