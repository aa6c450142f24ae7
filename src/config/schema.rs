//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream model provider settings.
    pub upstream: UpstreamConfig,

    /// Browser origins allowed to call the relay.
    pub cors: CorsConfig,

    /// Where the upstream bearer credential comes from.
    pub credentials: CredentialsConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8787").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8787".to_string(),
        }
    }
}

/// Which request/response family the upstream speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamStyle {
    /// `/v1/responses` with `input` and a reasoning-effort hint.
    #[default]
    Responses,
    /// `/v1/chat/completions` with `messages` and a sampling temperature.
    ChatCompletions,
}

impl UpstreamStyle {
    /// Endpoint path relative to the upstream base URL.
    pub fn path(self) -> &'static str {
        match self {
            UpstreamStyle::Responses => "v1/responses",
            UpstreamStyle::ChatCompletions => "v1/chat/completions",
        }
    }
}

/// Reasoning-effort hint for the responses style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    #[default]
    Low,
    Medium,
    High,
}

pub const DEFAULT_PERSONA: &str = "You are a calm, concise, helpful assistant. \
Keep answers short and clear. Be safety-minded: refuse harmful or illegal \
requests and offer a safe alternative instead.";

/// Upstream model provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Provider base URL; the style path is appended to it.
    pub base_url: String,

    /// Request/response family.
    pub style: UpstreamStyle,

    /// Model identifier sent with every request.
    pub model: String,

    /// Sampling temperature (chat completions only).
    pub temperature: f64,

    /// Reasoning effort (responses only).
    pub reasoning_effort: ReasoningEffort,

    /// Instruction prepended to every conversation.
    pub persona: String,

    /// Forward the caller's whole `messages` list instead of only the
    /// resolved user message.
    pub forward_history: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            style: UpstreamStyle::Responses,
            model: "gpt-5".to_string(),
            temperature: 0.7,
            reasoning_effort: ReasoningEffort::Low,
            persona: DEFAULT_PERSONA.to_string(),
            forward_history: false,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins granted an exact match. The first entry is returned to
    /// callers whose origin is not listed.
    pub allowed_origins: Vec<String>,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://willshacklett.github.io".to_string(),
                "http://localhost:5500".to_string(),
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
            max_age_secs: 86_400,
        }
    }
}

/// Upstream API key wrapper. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, rejecting blank values.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Credential source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Environment variable checked first.
    pub primary_env: String,

    /// Environment variable checked when the primary is unset or blank.
    pub fallback_env: String,

    /// Resolved key. Only ever populated from the environment.
    #[serde(skip)]
    pub api_key: Option<ApiKey>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            primary_env: "OPEN_AI_KEY".to_string(),
            fallback_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
        }
    }
}

impl CredentialsConfig {
    /// Human-readable guidance returned when no key is configured.
    pub fn fix_hint(&self) -> String {
        format!(
            "Set the {} (or {}) environment variable for the relay and restart it.",
            self.primary_env, self.fallback_env
        )
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request deadline (total time to answer the caller) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 120 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
