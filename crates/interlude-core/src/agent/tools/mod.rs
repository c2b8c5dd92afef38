//! Built-in agent tools.

pub mod memory_tools;
pub mod run_sql;
pub mod visualize;

use std::sync::Arc;

use interlude_types::config::ToolGrant;
use interlude_types::error::AgentError;

pub use memory_tools::{SaveQuestionToolArgsTool, SaveTextMemoryTool, SearchSavedCorrectToolUsesTool};
pub use run_sql::RunSqlTool;
pub use visualize::VisualizeDataTool;

use super::registry::ToolRegistry;
use super::sql::BoxSqlRunner;
use super::tool::BoxTool;

/// Names of every built-in tool.
pub const BUILTIN_TOOLS: [&str; 5] = [
    run_sql::RUN_SQL,
    memory_tools::SAVE_QUESTION_TOOL_ARGS,
    memory_tools::SEARCH_SAVED_CORRECT_TOOL_USES,
    memory_tools::SAVE_TEXT_MEMORY,
    visualize::VISUALIZE_DATA,
];

/// Build a registry holding the granted built-in tools.
///
/// `run_sql` needs a SQL runner; when none is configured the grant is
/// skipped with a warning. Unknown tool names are an error.
pub fn builtin_registry(
    grants: &[ToolGrant],
    sql: Option<Arc<BoxSqlRunner>>,
) -> Result<ToolRegistry, AgentError> {
    let mut registry = ToolRegistry::new();
    for grant in grants {
        let tool = match grant.name.as_str() {
            run_sql::RUN_SQL => match &sql {
                Some(runner) => BoxTool::new(RunSqlTool::new(Arc::clone(runner))),
                None => {
                    tracing::warn!("run_sql granted but no [agent.sql] configured; skipping");
                    continue;
                }
            },
            memory_tools::SAVE_QUESTION_TOOL_ARGS => BoxTool::new(SaveQuestionToolArgsTool),
            memory_tools::SEARCH_SAVED_CORRECT_TOOL_USES => BoxTool::new(SearchSavedCorrectToolUsesTool),
            memory_tools::SAVE_TEXT_MEMORY => BoxTool::new(SaveTextMemoryTool),
            visualize::VISUALIZE_DATA => BoxTool::new(VisualizeDataTool),
            other => return Err(AgentError::UnknownTool(other.to_string())),
        };
        registry.register(tool, grant.access_groups.clone())?;
    }
    Ok(registry)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use interlude_types::agent::{QueryResult, User};
    use interlude_types::config::default_tool_grants;
    use interlude_types::error::{SqlError, ToolError};

    use crate::agent::sql::SqlRunner;
    use crate::agent::tool::ToolContext;
    use crate::memory::{BoxAgentMemory, BoxEmbedder, HashEmbedder, InMemoryAgentMemory};

    pub(crate) fn user(groups: &[&str]) -> User {
        User {
            id: "u@example.com".to_string(),
            email: "u@example.com".to_string(),
            group_memberships: groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    pub(crate) fn ctx(user: User) -> ToolContext {
        let embedder = Arc::new(BoxEmbedder::new(HashEmbedder::new(64)));
        let memory = Arc::new(BoxAgentMemory::new(InMemoryAgentMemory::new(embedder, 100)));
        ToolContext::new(user, memory)
    }

    struct NoopRunner;

    impl SqlRunner for NoopRunner {
        fn dialect(&self) -> &str {
            "mysql"
        }

        async fn run(&self, _sql: &str) -> Result<QueryResult, SqlError> {
            Ok(QueryResult::default())
        }
    }

    #[test]
    fn test_default_grants_build_all_tools() {
        let runner = Arc::new(BoxSqlRunner::new(NoopRunner));
        let registry = builtin_registry(&default_tool_grants(), Some(runner)).unwrap();
        assert_eq!(registry.names(), BUILTIN_TOOLS.to_vec());
    }

    #[test]
    fn test_guest_cannot_see_save_question_tool() {
        let registry = builtin_registry(&default_tool_grants(), None).unwrap();
        let visible: Vec<String> = registry
            .tools_for(&user(&["user"]))
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert!(!visible.contains(&"save_question_tool_args".to_string()));
        assert!(visible.contains(&"save_text_memory".to_string()));
        assert_eq!(registry.tools_for(&user(&["admin"])).len(), 4);
    }

    #[test]
    fn test_run_sql_skipped_without_runner() {
        let registry = builtin_registry(&default_tool_grants(), None).unwrap();
        assert!(registry.get("run_sql").is_none());
    }

    #[test]
    fn test_unknown_tool_name_is_error() {
        let grants = vec![ToolGrant::new("rm_rf", &["admin"])];
        let err = builtin_registry(&grants, None).err().unwrap();
        assert!(matches!(err, AgentError::UnknownTool(name) if name == "rm_rf"));
    }

    #[test]
    fn test_duplicate_grant_is_error() {
        let grants = vec![
            ToolGrant::new("save_text_memory", &["admin"]),
            ToolGrant::new("save_text_memory", &["user"]),
        ];
        let err = builtin_registry(&grants, None).err().unwrap();
        assert!(matches!(err, AgentError::Tool(ToolError::Duplicate(_))));
    }
}
