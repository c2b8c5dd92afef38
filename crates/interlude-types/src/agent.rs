//! Agent types for Interlude.
//!
//! These types model the data agent's inputs and outputs: the resolved
//! user and the request they arrive with, tool calls and results, memory
//! items saved by the memory tools, and SQL query results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A user resolved from an incoming request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub group_memberships: Vec<String>,
}

impl User {
    pub fn is_member_of(&self, group: &str) -> bool {
        self.group_memberships.iter().any(|g| g == group)
    }

    /// True when the user belongs to at least one of `groups`.
    ///
    /// An empty `groups` list means the resource is open to everyone.
    pub fn has_any_group(&self, groups: &[String]) -> bool {
        groups.is_empty() || groups.iter().any(|g| self.is_member_of(g))
    }
}

/// Request metadata a user resolver can inspect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    pub cookies: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub remote_addr: Option<String>,
}

impl RequestContext {
    /// Build a context from a raw `Cookie` header (`a=1; b=2`).
    ///
    /// Malformed pairs are skipped.
    pub fn from_cookie_header(header: &str) -> Self {
        let cookies = header
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().to_string()))
            })
            .collect();
        Self {
            cookies,
            ..Self::default()
        }
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A request to run one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            arguments,
        }
    }
}

/// Outcome of a tool execution.
///
/// `content` is the text handed back to the LLM; `data` carries an optional
/// structured payload for the UI (tables, chart specs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Kind of an agent memory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// Free-form text the agent chose to remember.
    Text,
    /// A question together with the tool call that answered it correctly.
    ToolUsage,
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryKind::Text => write!(f, "text"),
            MemoryKind::ToolUsage => write!(f, "tool_usage"),
        }
    }
}

impl FromStr for MemoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(MemoryKind::Text),
            "tool_usage" => Ok(MemoryKind::ToolUsage),
            other => Err(format!("invalid memory kind: '{other}'")),
        }
    }
}

/// A single entry in agent memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: Uuid,
    pub kind: MemoryKind,
    /// Text memory body, or the question for a tool usage.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_args: Option<serde_json::Value>,
    /// Email of the user who saved it.
    pub saved_by: String,
    pub created_at: DateTime<Utc>,
}

impl MemoryItem {
    pub fn text(content: impl Into<String>, saved_by: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind: MemoryKind::Text,
            content: content.into(),
            tool_name: None,
            tool_args: None,
            saved_by: saved_by.into(),
            created_at: Utc::now(),
        }
    }

    pub fn tool_usage(
        question: impl Into<String>,
        tool_name: impl Into<String>,
        tool_args: serde_json::Value,
        saved_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind: MemoryKind::ToolUsage,
            content: question.into(),
            tool_name: Some(tool_name.into()),
            tool_args: Some(tool_args),
            saved_by: saved_by.into(),
            created_at: Utc::now(),
        }
    }
}

/// A memory item returned by similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedMemory {
    pub item: MemoryItem,
    /// Cosine similarity to the query, in [-1, 1].
    pub similarity: f32,
    /// 1-based position in the result list.
    pub rank: usize,
}

/// Tabular result of a SQL query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a pipe-separated text table for the LLM, truncated to
    /// `max_rows` rows.
    pub fn to_text(&self, max_rows: usize) -> String {
        let mut out = self.columns.join(" | ");
        for row in self.rows.iter().take(max_rows) {
            out.push('\n');
            let cells: Vec<String> = row
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Null => "NULL".to_string(),
                    other => other.to_string(),
                })
                .collect();
            out.push_str(&cells.join(" | "));
        }
        if self.rows.len() > max_rows {
            out.push_str(&format!("\n... ({} more rows)", self.rows.len() - max_rows));
        }
        out
    }
}

/// Runtime limits of an assembled agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub max_tool_iterations: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: 100,
        }
    }
}

/// A tool as seen by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub access_groups: Vec<String>,
    /// JSON Schema of the tool's arguments.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Report of an assembled agent, from one user's point of view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInventory {
    pub user: User,
    pub provider: String,
    pub model: String,
    pub embedding_model: String,
    pub embedding_dimension: usize,
    pub memory_max_items: usize,
    pub memory_len: usize,
    pub max_tool_iterations: u32,
    /// Tools this user may call.
    pub tools: Vec<ToolSummary>,
    /// Tools registered but hidden from this user.
    pub hidden_tools: Vec<String>,
}
