//! Upstream model API client.
//!
//! # Responsibilities
//! - Build the provider request for the configured style
//! - Prepend the persona instruction to the conversation
//! - Send exactly one bearer-authenticated POST per relay request
//! - Classify transport failures, non-success statuses and undecodable bodies
//!
//! # Design Decisions
//! - No retries, no streaming, no client-side timeout
//! - The response body is kept as raw JSON; see `reply.rs` for sniffing

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::{ApiKey, ReasoningEffort, UpstreamConfig, UpstreamStyle};
use crate::relay::error::RelayError;
use crate::relay::payload::{Role, UpstreamMessage};

#[derive(Debug, Serialize)]
pub struct Reasoning {
    pub effort: ReasoningEffort,
}

/// Request body for either upstream style.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UpstreamRequest<'a> {
    ChatCompletions {
        model: &'a str,
        messages: &'a [UpstreamMessage],
        temperature: f64,
    },
    Responses {
        model: &'a str,
        reasoning: Reasoning,
        input: &'a [UpstreamMessage],
    },
}

/// Error building the upstream client.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamSetupError {
    #[error("Invalid upstream base URL '{url}': {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Client for the configured model provider.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    endpoint: Url,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamSetupError> {
        let endpoint = endpoint_url(&config.base_url, config.style).map_err(|source| {
            UpstreamSetupError::BaseUrl {
                url: config.base_url.clone(),
                source,
            }
        })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("chat-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            config: config.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Persona instruction followed by the caller's conversation.
    pub fn build_messages(&self, conversation: Vec<UpstreamMessage>) -> Vec<UpstreamMessage> {
        let instruction_role = match self.config.style {
            UpstreamStyle::Responses => Role::Developer,
            UpstreamStyle::ChatCompletions => Role::System,
        };

        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(UpstreamMessage::new(instruction_role, self.config.persona.clone()));
        messages.extend(conversation);
        messages
    }

    /// Request body for the configured style.
    pub fn request<'a>(&'a self, messages: &'a [UpstreamMessage]) -> UpstreamRequest<'a> {
        match self.config.style {
            UpstreamStyle::ChatCompletions => UpstreamRequest::ChatCompletions {
                model: &self.config.model,
                messages,
                temperature: self.config.temperature,
            },
            UpstreamStyle::Responses => UpstreamRequest::Responses {
                model: &self.config.model,
                reasoning: Reasoning {
                    effort: self.config.reasoning_effort,
                },
                input: messages,
            },
        }
    }

    /// Send one completion request and return the provider's JSON body.
    pub async fn complete(
        &self,
        api_key: &ApiKey,
        conversation: Vec<UpstreamMessage>,
    ) -> Result<Value, RelayError> {
        let messages = self.build_messages(conversation);

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(api_key.expose())
            .json(&self.request(&messages))
            .send()
            .await
            .map_err(RelayError::Transport)?;

        let status = response.status();
        let text = response.text().await.map_err(RelayError::Transport)?;
        let parsed = serde_json::from_str::<Value>(&text);

        if !status.is_success() {
            let details = parsed.unwrap_or(Value::String(text));
            tracing::warn!(status = status.as_u16(), details = %details, "Upstream returned an error");
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        parsed.map_err(|e| {
            tracing::warn!(status = status.as_u16(), error = %e, "Upstream body is not JSON");
            RelayError::UpstreamDecode {
                status: status.as_u16(),
                details: text,
            }
        })
    }
}

/// `base_url` joined with the style path, keeping any base path prefix.
fn endpoint_url(base_url: &str, style: UpstreamStyle) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(style.path())
}
