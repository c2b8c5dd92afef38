//! SqlRunner trait: executes a SQL statement and returns rows.
//!
//! The MySQL implementation lives in interlude-infra.

use std::future::Future;
use std::pin::Pin;

use interlude_types::agent::QueryResult;
use interlude_types::error::SqlError;

pub trait SqlRunner: Send + Sync {
    /// Dialect name shown to the LLM (e.g. "mysql").
    fn dialect(&self) -> &str;

    fn run(&self, sql: &str) -> impl Future<Output = Result<QueryResult, SqlError>> + Send;
}

/// Object-safe version of [`SqlRunner`].
pub trait SqlRunnerDyn: Send + Sync {
    fn dialect_dyn(&self) -> &str;

    fn run_boxed<'a>(
        &'a self,
        sql: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, SqlError>> + Send + 'a>>;
}

impl<T: SqlRunner> SqlRunnerDyn for T {
    fn dialect_dyn(&self) -> &str {
        self.dialect()
    }

    fn run_boxed<'a>(
        &'a self,
        sql: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, SqlError>> + Send + 'a>> {
        Box::pin(self.run(sql))
    }
}

pub struct BoxSqlRunner {
    inner: Box<dyn SqlRunnerDyn + Send + Sync>,
}

impl BoxSqlRunner {
    pub fn new<T: SqlRunner + 'static>(runner: T) -> Self {
        Self {
            inner: Box::new(runner),
        }
    }

    pub fn dialect(&self) -> &str {
        self.inner.dialect_dyn()
    }

    pub async fn run(&self, sql: &str) -> Result<QueryResult, SqlError> {
        self.inner.run_boxed(sql).await
    }
}
