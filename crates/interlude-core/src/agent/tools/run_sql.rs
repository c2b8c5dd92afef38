//! `run_sql`: execute a SQL statement against the configured database.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;

use interlude_types::agent::ToolResult;
use interlude_types::error::ToolError;

use crate::agent::sql::BoxSqlRunner;
use crate::agent::tool::{Tool, ToolContext, parse_args, schema_of};

pub const RUN_SQL: &str = "run_sql";

/// Rows rendered into the LLM-facing text; the full result rides in `data`.
const DEFAULT_MAX_ROWS: usize = 100;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunSqlArgs {
    /// The SQL statement to execute.
    pub sql: String,
}

pub struct RunSqlTool {
    runner: Arc<BoxSqlRunner>,
    max_rows: usize,
    description: String,
}

impl RunSqlTool {
    pub fn new(runner: Arc<BoxSqlRunner>) -> Self {
        let description = format!(
            "Execute a {} SQL query against the database and return the result rows.",
            runner.dialect()
        );
        Self {
            runner,
            max_rows: DEFAULT_MAX_ROWS,
            description,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }
}

impl Tool for RunSqlTool {
    fn name(&self) -> &str {
        RUN_SQL
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> serde_json::Value {
        schema_of::<RunSqlArgs>()
    }

    async fn execute(&self, _ctx: &ToolContext, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: RunSqlArgs = parse_args(args)?;
        let sql = args.sql.trim();
        if sql.is_empty() {
            return Err(ToolError::InvalidArguments("sql must not be empty".to_string()));
        }

        let result = self.runner.run(sql).await?;
        tracing::debug!(rows = result.row_count(), "query returned");

        let content = if result.is_empty() {
            "Query executed successfully. No rows returned.".to_string()
        } else {
            result.to_text(self.max_rows)
        };
        let data = serde_json::to_value(&result)
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        Ok(ToolResult::ok(content).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use interlude_types::agent::QueryResult;
    use interlude_types::error::SqlError;

    use super::super::tests::{ctx, user};
    use crate::agent::sql::SqlRunner;

    struct FixedRunner;

    impl SqlRunner for FixedRunner {
        fn dialect(&self) -> &str {
            "mysql"
        }

        async fn run(&self, sql: &str) -> Result<QueryResult, SqlError> {
            if sql.starts_with("SELECT") {
                Ok(QueryResult {
                    columns: vec!["n".to_string()],
                    rows: vec![vec![json!(42)]],
                })
            } else if sql.starts_with("UPDATE") {
                Ok(QueryResult::default())
            } else {
                Err(SqlError::Query(format!("syntax error near '{sql}'")))
            }
        }
    }

    fn tool() -> RunSqlTool {
        RunSqlTool::new(Arc::new(BoxSqlRunner::new(FixedRunner)))
    }

    #[tokio::test]
    async fn test_rows_rendered_and_attached() {
        let result = tool()
            .execute(&ctx(user(&["user"])), json!({"sql": "SELECT COUNT(*) AS n FROM t"}))
            .await
            .unwrap();
        assert_eq!(result.content, "n\n42");
        assert_eq!(result.data.unwrap()["rows"], json!([[42]]));
    }

    #[tokio::test]
    async fn test_no_rows_message() {
        let result = tool()
            .execute(&ctx(user(&["user"])), json!({"sql": "UPDATE t SET a = 1"}))
            .await
            .unwrap();
        assert!(result.content.contains("No rows"));
    }

    #[tokio::test]
    async fn test_query_error_propagates() {
        let err = tool()
            .execute(&ctx(user(&["user"])), json!({"sql": "SELEC 1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Sql(SqlError::Query(_))));
    }

    #[tokio::test]
    async fn test_blank_sql_is_invalid() {
        let err = tool()
            .execute(&ctx(user(&["user"])), json!({"sql": "  "}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_description_names_dialect() {
        assert!(tool().description().contains("mysql"));
    }
}
