//! Configuration loader for Interlude.
//!
//! Reads `interlude.toml` (or the path given with `--config`) and applies
//! environment overrides on top. A missing file yields the defaults; a file
//! that exists but cannot be read or parsed is an error, so a server never
//! starts on surprise defaults.

use std::path::Path;

use interlude_types::config::InterludeConfig;
use interlude_types::error::ConfigError;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "interlude.toml";

pub const ENV_LLM_BASE_URL: &str = "INTERLUDE_LLM_BASE_URL";
pub const ENV_LLM_MODEL: &str = "INTERLUDE_LLM_MODEL";
pub const ENV_LLM_API_KEY: &str = "INTERLUDE_LLM_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_HOST: &str = "INTERLUDE_HOST";
pub const ENV_PORT: &str = "INTERLUDE_PORT";

/// Load configuration from `path`, then apply process environment overrides.
pub async fn load_config(path: &Path) -> Result<InterludeConfig, ConfigError> {
    let config = read_config_file(path).await?;
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Parse the TOML file at `path` without looking at the environment.
pub async fn read_config_file(path: &Path) -> Result<InterludeConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(InterludeConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    let config: InterludeConfig = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Empty values are ignored. `INTERLUDE_LLM_API_KEY` wins over
/// `OPENAI_API_KEY`, and either wins over the file.
pub fn apply_env_overrides(
    mut config: InterludeConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<InterludeConfig, ConfigError> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(base_url) = get(ENV_LLM_BASE_URL) {
        config.llm.base_url = base_url;
    }
    if let Some(model) = get(ENV_LLM_MODEL) {
        config.llm.model = model;
    }
    if let Some(key) = get(ENV_LLM_API_KEY).or_else(|| get(ENV_OPENAI_API_KEY)) {
        config.llm.api_key = Some(key);
    }
    if let Some(host) = get(ENV_HOST) {
        config.server.host = host;
    }
    if let Some(port) = get(ENV_PORT) {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{ENV_PORT} must be a port number, got '{port}'")))?;
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &InterludeConfig) -> Result<(), ConfigError> {
    if config.server.turn_timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "server.turn_timeout_secs must be greater than 0".to_string(),
        ));
    }
    if config.agent.memory.max_items == 0 {
        return Err(ConfigError::Invalid(
            "agent.memory.max_items must be greater than 0".to_string(),
        ));
    }
    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::Invalid("llm.model must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[tokio::test]
    async fn missing_file_returns_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = read_config_file(&tmp.path().join("interlude.toml")).await.unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.agent.max_tool_iterations, 100);
        assert_eq!(config.agent.memory.max_items, 1000);
    }

    #[tokio::test]
    async fn valid_toml_is_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("interlude.toml");
        tokio::fs::write(
            &path,
            r#"
[server]
port = 9000
turn_timeout_secs = 30

[llm]
base_url = "http://10.1.30.1:18080/v1"
model = "qwen3-coder"

[agent.sql]
url = "mysql://root:pw@10.1.30.1:3306/shop"

[agent.embedding]
base_url = "http://10.1.30.1:18081/v1"
model = "Qwen3-Embedding-8B"
dimensions = 4096

[[agent.tools]]
name = "run_sql"
access_groups = ["admin"]
"#,
        )
        .await
        .unwrap();

        let config = read_config_file(&path).await.unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.turn_timeout_secs, 30);
        assert_eq!(config.server.keep_alive_secs, 15);
        assert_eq!(config.llm.model, "qwen3-coder");
        assert_eq!(config.agent.sql.unwrap().max_connections, 5);
        let embedding = config.agent.embedding.unwrap();
        assert_eq!(embedding.dimensions, Some(4096));
        assert_eq!(embedding.batch_size, 32);
        assert_eq!(config.agent.tools.len(), 1);
        assert_eq!(config.agent.users.cookie_name, "vanna_email");
    }

    #[tokio::test]
    async fn malformed_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("interlude.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!").await.unwrap();

        let err = read_config_file(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_overrides_win_over_file() {
        let config = apply_env_overrides(
            InterludeConfig::default(),
            env(&[
                (ENV_LLM_BASE_URL, "http://localhost:8080/v1"),
                (ENV_LLM_MODEL, "llama3"),
                (ENV_HOST, "127.0.0.1"),
                (ENV_PORT, "8123"),
            ]),
        )
        .unwrap();
        assert_eq!(config.llm.base_url, "http://localhost:8080/v1");
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    fn api_key_prefers_interlude_variable() {
        let config = apply_env_overrides(
            InterludeConfig::default(),
            env(&[(ENV_LLM_API_KEY, "sk-interlude"), (ENV_OPENAI_API_KEY, "sk-openai")]),
        )
        .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-interlude"));

        let config =
            apply_env_overrides(InterludeConfig::default(), env(&[(ENV_OPENAI_API_KEY, "sk-openai")]))
                .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-openai"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let config =
            apply_env_overrides(InterludeConfig::default(), env(&[(ENV_LLM_MODEL, "  ")])).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn bad_port_is_invalid() {
        let err = apply_env_overrides(InterludeConfig::default(), env(&[(ENV_PORT, "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("INTERLUDE_PORT")));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut config = InterludeConfig::default();
        config.server.turn_timeout_secs = 0;
        assert!(matches!(
            apply_env_overrides(config, env(&[])),
            Err(ConfigError::Invalid(_))
        ));
    }
}
