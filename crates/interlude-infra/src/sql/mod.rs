//! SQL runners behind the agent's `run_sql` tool.

pub mod mysql;

pub use mysql::MySqlRunner;
