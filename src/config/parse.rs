use super::types::*;
use crate::config::{env_var_regex, expand_env_vars, expand_tilde};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse(e) => ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        )),
        other => other,
    })
}

/// Parse and validate config text, expanding `$env{VAR}` and `~` first.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let yaml_string = expand_env_vars(yaml);
    check_unexpanded_vars(&yaml_string)?;

    let mut config: Config = serde_yaml::from_str(&yaml_string)?;

    if let Some(path) = config.storage.path.as_mut() {
        *path = expand_tilde(path);
    }

    validate_config(&config)?;

    Ok(config)
}

/// References left in full-line comments are ignored.
fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let mut unexpanded: Vec<&str> = yaml_string
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| env_var_regex().captures_iter(line))
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect();

    if unexpanded.is_empty() {
        return Ok(());
    }

    unexpanded.sort_unstable();
    unexpanded.dedup();

    Err(ConfigError::Validation(format!(
        "environment variables are not set: {}\n\
         \n\
         Either export them before starting, or replace the $env{{...}} references\n\
         in the config file with literal values",
        unexpanded.join(", ")
    )))
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if let Err(e) = config.server.listen.parse::<SocketAddr>() {
        errors.push(format!(
            "server.listen: '{}' is not a socket address ({})",
            config.server.listen, e
        ));
    }

    if config.server.max_body_bytes == 0 {
        errors.push("server.max_body_bytes must be greater than 0".to_string());
    }

    match (config.storage.backend, &config.storage.path) {
        (StorageBackend::Duckdb, None) => {
            errors.push("storage.path is required for the duckdb backend".to_string());
        }
        (StorageBackend::Memory, Some(path)) => {
            errors.push(format!(
                "storage.path '{}' is set but the memory backend does not use it",
                path.display()
            ));
        }
        _ => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:7245");
        assert_eq!(config.server.max_body_bytes, 16 * 1024 * 1024);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_duckdb_backend() {
        let config = parse_config(
            r#"
server:
  listen: 0.0.0.0:8080
  max_body_bytes: 1024
storage:
  backend: duckdb
  path: /var/lib/logs-transmitter/batches.duckdb
"#,
        )
        .unwrap();

        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.server.max_body_bytes, 1024);
        assert_eq!(config.storage.backend, StorageBackend::Duckdb);
        assert_eq!(
            config.storage.path.as_deref(),
            Some(Path::new("/var/lib/logs-transmitter/batches.duckdb"))
        );
    }

    #[test]
    fn test_validation_collects_every_error() {
        let err = parse_config(
            r#"
server:
  listen: not-an-address
  max_body_bytes: 0
storage:
  backend: duckdb
"#,
        )
        .unwrap_err();

        match err {
            ConfigError::ValidationList(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors[0].contains("server.listen"));
                assert!(errors[1].contains("max_body_bytes"));
                assert!(errors[2].contains("storage.path"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_memory_backend_rejects_path() {
        let err = parse_config("storage:\n  backend: memory\n  path: /tmp/x.duckdb\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationList(_)));
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let err = parse_config("storage:\n  backend: cosmos\n").unwrap_err();
        assert!(matches!(err, ConfigError::YamlParse(_)));
    }

    #[test]
    fn test_unexpanded_env_var_reported() {
        let err = parse_config(
            "storage:\n  backend: duckdb\n  path: $env{LOGS_TRANSMITTER_UNSET_DIR}/db.duckdb\n",
        )
        .unwrap_err();

        match err {
            ConfigError::Validation(msg) => assert!(msg.contains("LOGS_TRANSMITTER_UNSET_DIR")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_env_var_in_comment_ignored() {
        let config = parse_config(
            "# path may use $env{LOGS_TRANSMITTER_UNSET_DIR}\n  # indented $env{ALSO_UNSET}\nserver:\n  listen: 127.0.0.1:7245\n",
        )
        .unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:7245");
    }

    #[test]
    fn test_env_var_expanded_in_path() {
        std::env::set_var("LOGS_TRANSMITTER_TEST_DATA_DIR", "/srv/data");
        let config = parse_config(
            "storage:\n  backend: duckdb\n  path: $env{LOGS_TRANSMITTER_TEST_DATA_DIR}/db.duckdb\n",
        )
        .unwrap();
        std::env::remove_var("LOGS_TRANSMITTER_TEST_DATA_DIR");

        assert_eq!(
            config.storage.path.as_deref(),
            Some(Path::new("/srv/data/db.duckdb"))
        );
    }
}
