//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{ApiKey, RelayConfig};
use crate::config::validation::{validate_config, ValidationError};

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

/// Parse a TOML config file. No validation; see [`load_config`].
pub fn read_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment values onto a config and resolve the upstream key.
///
/// Recognized variables: `MODEL`, `ALLOWED_ORIGINS` (comma-separated),
/// `UPSTREAM_BASE_URL`, `BIND_ADDRESS`, and the two credential variable
/// names configured under `[credentials]`.
pub fn apply_env_overrides<F>(mut config: RelayConfig, lookup: F) -> RelayConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(model) = non_blank(lookup("MODEL")) {
        config.upstream.model = model;
    }
    if let Some(base_url) = non_blank(lookup("UPSTREAM_BASE_URL")) {
        config.upstream.base_url = base_url;
    }
    if let Some(bind) = non_blank(lookup("BIND_ADDRESS")) {
        config.listener.bind_address = bind;
    }
    if let Some(origins) = non_blank(lookup("ALLOWED_ORIGINS")) {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
    }

    let primary = lookup(&config.credentials.primary_env).and_then(ApiKey::new);
    config.credentials.api_key =
        primary.or_else(|| lookup(&config.credentials.fallback_env).and_then(ApiKey::new));

    config
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Load configuration from an optional TOML file, overlay the process
/// environment and an optional bind address from the command line, and
/// validate the result.
pub fn load_config(
    path: Option<&Path>,
    bind_override: Option<String>,
) -> Result<RelayConfig, ConfigError> {
    let config = match path {
        Some(path) => read_config(path)?,
        None => RelayConfig::default(),
    };
    let mut config = apply_env_overrides(config, |name| std::env::var(name).ok());
    if let Some(bind) = bind_override {
        config.listener.bind_address = bind;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
