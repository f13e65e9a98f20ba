//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::{default_backends, BalancerConfig};
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
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
///
/// A file without any `[[backends]]` entry gets the default local pool.
pub fn parse_config(content: &str) -> Result<BalancerConfig, ConfigError> {
    let mut config: BalancerConfig = toml::from_str(content)?;
    if config.backends.is_empty() {
        config.backends = default_backends();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Built-in configuration used when no file is given.
pub fn default_config() -> BalancerConfig {
    BalancerConfig {
        backends: default_backends(),
        ..BalancerConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_default_pool() {
        let config = parse_config("").unwrap();
        assert_eq!(config.backends.len(), 3);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_validation_errors_are_reported() {
        let err = parse_config(
            r#"
            [[backends]]
            address = "http://127.0.0.1:9001"

            [[backends]]
            address = "http://127.0.0.1:9001"

            [health_check]
            interval_secs = 0
            "#,
        )
        .unwrap_err();

        match err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("backends = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/balancer.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
