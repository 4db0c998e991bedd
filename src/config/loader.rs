//! Configuration loading from disk and environment.

use std::env;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `store.url`.
pub const STORE_URL_ENV: &str = "REDIS_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
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
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load from `path` when given, otherwise start from defaults, then apply
/// environment overrides and validate the result.
pub fn load_with_env(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    apply_store_url(&mut config, env::var(STORE_URL_ENV).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// A non-empty connection string enables the store; an empty one leaves the
/// file setting untouched.
fn apply_store_url(config: &mut ServiceConfig, url: Option<String>) {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        config.store.url = Some(url.trim().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_file() {
        let path = env::temp_dir().join("resilience_layer_loader_test.toml");
        fs::write(&path, "[cache]\ndefault_ttl_secs = 60\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.cache.default_ttl_secs, 60);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = parse_config("[lock]\nttl_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("lock.ttl_secs"));
    }

    #[test]
    fn test_validation_error_lists_every_field() {
        let err = parse_config("[lock]\nttl_secs = 0\nkey_prefix = \"\"\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: lock.ttl_secs: must be > 0, lock.key_prefix: must not be empty"
        );
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[cache\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("Parse error: "));
    }

    #[test]
    fn test_store_url_override() {
        let mut config = ServiceConfig::default();
        apply_store_url(&mut config, Some("  ".into()));
        assert!(config.store.url.is_none());

        apply_store_url(&mut config, Some("redis://cache:6379/".into()));
        assert_eq!(config.store.url.as_deref(), Some("redis://cache:6379/"));
    }
}
