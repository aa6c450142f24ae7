//! The relay pipeline.

use serde::Serialize;

use crate::config::{CredentialsConfig, RelayConfig};
use crate::relay::error::RelayError;
use crate::relay::payload::{parse_body, ChatPayload, Role, UpstreamMessage};
use crate::relay::reply::reply_or_placeholder;
use crate::relay::upstream::{UpstreamClient, UpstreamSetupError};

/// Successful relay result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayReply {
    pub reply: String,
    pub ok: bool,
}

/// Parses a chat payload, calls the upstream once and normalizes the answer.
#[derive(Clone)]
pub struct Relay {
    upstream: UpstreamClient,
    credentials: CredentialsConfig,
    forward_history: bool,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> Result<Self, UpstreamSetupError> {
        Ok(Self {
            upstream: UpstreamClient::new(&config.upstream)?,
            credentials: config.credentials.clone(),
            forward_history: config.upstream.forward_history,
        })
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Run one request body through the pipeline.
    pub async fn handle(&self, request_id: &str, raw: &[u8]) -> Result<RelayReply, RelayError> {
        let body = parse_body(raw)?;
        tracing::debug!(
            request_id = %request_id,
            body = %String::from_utf8_lossy(raw),
            "Incoming body"
        );

        let payload = ChatPayload::from_value(&body);
        let Some(user_message) = payload.user_message() else {
            tracing::warn!(request_id = %request_id, "No usable message in payload");
            return Err(RelayError::NoMessage { got: body });
        };
        tracing::debug!(request_id = %request_id, user_message = %user_message, "Resolved user message");

        let Some(api_key) = self.credentials.api_key.as_ref() else {
            tracing::error!(
                request_id = %request_id,
                primary_env = %self.credentials.primary_env,
                fallback_env = %self.credentials.fallback_env,
                "No upstream API key configured"
            );
            return Err(RelayError::MissingApiKey {
                fix: self.credentials.fix_hint(),
            });
        };

        // History only applies when the message was resolved from `messages`.
        let from_history = payload
            .message
            .as_deref()
            .map_or(true, |m| m.trim().is_empty());
        let conversation = if self.forward_history && from_history {
            payload.conversation()
        } else {
            vec![UpstreamMessage::new(Role::User, user_message)]
        };

        let response = self
            .upstream
            .complete(api_key, conversation)
            .await
            .inspect_err(|e| {
                if let RelayError::Transport(source) = e {
                    tracing::error!(request_id = %request_id, error = %source, "Upstream call failed");
                }
            })?;

        let reply = reply_or_placeholder(&response);
        tracing::debug!(request_id = %request_id, reply = %reply, "Reply");
        tracing::info!(
            request_id = %request_id,
            model = %self.upstream.model(),
            reply_len = reply.len(),
            "Relayed chat request"
        );

        Ok(RelayReply { reply, ok: true })
    }
}
