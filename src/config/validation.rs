//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (temperature, limits, timeouts)
//! - Check that URLs and origins are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("upstream.base_url '{0}' must be an http(s) URL")]
    BaseUrl(String),

    #[error("upstream.model must not be empty")]
    EmptyModel,

    #[error("upstream.persona must not be empty")]
    EmptyPersona,

    #[error("upstream.temperature {0} is outside 0.0..=2.0")]
    Temperature(f64),

    #[error("cors.allowed_origins must list at least one origin")]
    NoOrigins,

    #[error("cors.allowed_origins entry '{0}' is not a bare scheme://host[:port] origin")]
    Origin(String),

    #[error("limits.max_body_size must be greater than zero")]
    BodyLimit,

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::BaseUrl(config.upstream.base_url.clone())),
    }

    if config.upstream.model.trim().is_empty() {
        errors.push(ValidationError::EmptyModel);
    }
    if config.upstream.persona.trim().is_empty() {
        errors.push(ValidationError::EmptyPersona);
    }
    if !(0.0..=2.0).contains(&config.upstream.temperature) {
        errors.push(ValidationError::Temperature(config.upstream.temperature));
    }

    if config.cors.allowed_origins.is_empty() {
        errors.push(ValidationError::NoOrigins);
    }
    for origin in &config.cors.allowed_origins {
        if !is_bare_origin(origin) {
            errors.push(ValidationError::Origin(origin.clone()));
        }
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::BodyLimit);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Browsers send `Origin` as `scheme://host[:port]`, so anything with a path,
/// query or trailing slash can never match exactly.
fn is_bare_origin(origin: &str) -> bool {
    match Url::parse(origin) {
        Ok(url) => url.has_host() && url.origin().ascii_serialization() == origin,
        Err(_) => false,
    }
}
