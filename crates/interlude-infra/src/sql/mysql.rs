//! MySQL runner on sqlx.
//!
//! The pool is created lazily so assembling an agent never touches the
//! network; the first `run_sql` call opens the first connection. Every
//! connection uses the `utf8mb4` charset.

use std::str::FromStr;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use interlude_core::agent::SqlRunner;
use interlude_types::agent::QueryResult;
use interlude_types::config::SqlConfig;
use interlude_types::error::SqlError;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct MySqlRunner {
    pool: MySqlPool,
}

impl MySqlRunner {
    /// Build a lazily-connecting pool from `[agent.sql]`.
    ///
    /// Only the URL is validated here.
    pub fn connect_lazy(config: &SqlConfig) -> Result<Self, SqlError> {
        let options = MySqlConnectOptions::from_str(&config.url)
            .map_err(|e| SqlError::Connection(format!("invalid MySQL URL: {e}")))?
            .charset("utf8mb4");

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    #[cfg(test)]
    fn with_acquire_timeout(config: &SqlConfig, timeout: Duration) -> Result<Self, SqlError> {
        let options = MySqlConnectOptions::from_str(&config.url)
            .map_err(|e| SqlError::Connection(format!("invalid MySQL URL: {e}")))?;
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(timeout)
            .connect_lazy_with(options);
        Ok(Self { pool })
    }
}

impl SqlRunner for MySqlRunner {
    fn dialect(&self) -> &str {
        "mysql"
    }

    async fn run(&self, sql: &str) -> Result<QueryResult, SqlError> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let columns: Vec<String> = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let rows = rows
            .iter()
            .map(row_to_json)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(columns = columns.len(), rows = rows.len(), "query executed");
        Ok(QueryResult { columns, rows })
    }
}

fn map_sqlx_error(err: sqlx::Error) -> SqlError {
    match err {
        sqlx::Error::Database(db) => SqlError::Query(db.message().to_string()),
        sqlx::Error::ColumnDecode { index, source } => {
            SqlError::Query(format!("cannot decode column {index}: {source}"))
        }
        other @ (sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Configuration(_)
        | sqlx::Error::Protocol(_)) => SqlError::Connection(other.to_string()),
        other => SqlError::Query(other.to_string()),
    }
}

fn row_to_json(row: &MySqlRow) -> Result<Vec<serde_json::Value>, SqlError> {
    (0..row.columns().len())
        .map(|i| cell_to_json(row, i).map_err(map_sqlx_error))
        .collect()
}

/// Decode one cell by its MySQL type name.
///
/// DECIMAL, JSON and unknown types come back as strings.
fn cell_to_json(row: &MySqlRow, i: usize) -> Result<serde_json::Value, sqlx::Error> {
    use serde_json::Value;

    if row.try_get_raw(i)?.is_null() {
        return Ok(Value::Null);
    }

    let type_name = row.column(i).type_info().name().to_ascii_uppercase();
    let value = match type_name.as_str() {
        "BOOLEAN" => Value::from(row.try_get::<bool, _>(i)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            Value::from(row.try_get::<i64, _>(i)?)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "YEAR" => Value::from(row.try_get::<u64, _>(i)?),
        "FLOAT" => Value::from(f64::from(row.try_get::<f32, _>(i)?)),
        "DOUBLE" => Value::from(row.try_get::<f64, _>(i)?),
        "DATE" => Value::from(row.try_get::<chrono::NaiveDate, _>(i)?.to_string()),
        "TIME" => Value::from(row.try_get::<chrono::NaiveTime, _>(i)?.to_string()),
        "DATETIME" => Value::from(
            row.try_get::<chrono::NaiveDateTime, _>(i)?
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ),
        "TIMESTAMP" => Value::from(
            row.try_get::<chrono::DateTime<chrono::Utc>, _>(i)?
                .to_rfc3339(),
        ),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => {
            let bytes: Vec<u8> = row.try_get_unchecked(i)?;
            Value::from(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Value::from(row.try_get_unchecked::<String, _>(i)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> SqlConfig {
        SqlConfig {
            url: url.to_string(),
            max_connections: 2,
        }
    }

    #[tokio::test]
    async fn test_connect_lazy_does_not_touch_network() {
        // Nothing listens on this host; creation must still succeed.
        let runner = MySqlRunner::connect_lazy(&config("mysql://root:pw@10.255.255.1:3306/shop")).unwrap();
        assert_eq!(runner.dialect(), "mysql");
    }

    #[tokio::test]
    async fn test_invalid_url_is_connection_error() {
        let err = MySqlRunner::connect_lazy(&config("postgres://nope")).err().unwrap();
        assert!(matches!(err, SqlError::Connection(msg) if msg.contains("invalid MySQL URL")));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connection_error() {
        let runner = MySqlRunner::with_acquire_timeout(
            &config("mysql://root:pw@127.0.0.1:1/shop"),
            Duration::from_millis(500),
        )
        .unwrap();
        let err = runner.run("SELECT 1").await.unwrap_err();
        assert!(matches!(err, SqlError::Connection(_)), "got {err:?}");
    }

    #[test]
    fn test_pool_timeout_maps_to_connection() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            SqlError::Connection(_)
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            SqlError::Query(_)
        ));
    }
}
