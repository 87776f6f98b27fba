//! Configuration loading from disk.

use std::path::Path;
use std::fs;
use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [[groups]]
            name = "orders"
            targets = ["postgres://app@db1:5432/orders", "postgres://app@db2:5432/orders"]

            [heartbeat]
            interval_ms = 500

            [retries]
            enabled = true
            max_attempts = 2

            [admin]
            api_key = "s3cret"
            bind_address = "127.0.0.1:9999"
            "#,
        )
        .unwrap();

        assert_eq!(config.groups[0].name, "orders");
        assert_eq!(config.heartbeat.interval_ms, 500);
        assert_eq!(config.retries.max_attempts, 2);
        assert_eq!(config.admin.api_key, "s3cret");
    }

    #[test]
    fn test_validation_error_message_lists_all() {
        let err = parse_config("[heartbeat]\ninterval_ms = 0\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Validation failed: "));
        assert!(msg.contains("no replica groups configured"));
        assert!(msg.contains("heartbeat.interval_ms"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[[groups]\nname = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error: "));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
