//! Inbound chat payloads.
//!
//! Two shapes are accepted:
//!
//! ```text
//! { "message": "hi" }
//! { "messages": [{ "role": "user", "content": "hi" }, ...] }
//! ```
//!
//! `content` may also be a list of parts (`{ "type": "text", "text": "..." }`).
//! Decoding is lenient: a field of the wrong type is treated as absent so that
//! the caller gets the "no message" hint instead of a parse error.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::relay::error::RelayError;

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
    Developer,
    Assistant,
}

/// One element of structured message content.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

impl ContentPart {
    fn usable_text(&self) -> Option<&str> {
        if self.kind.as_deref() != Some("text") {
            return None;
        }
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Message content: a plain string or a list of parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
    #[default]
    Absent,
}

impl<'de> Deserialize<'de> for MessageContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => MessageContent::Text(text),
            Value::Array(items) => MessageContent::Parts(
                items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect(),
            ),
            _ => MessageContent::Absent,
        })
    }
}

impl MessageContent {
    /// Trimmed, non-empty text: the string itself, or the first usable
    /// `text` part.
    pub fn text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text.trim()).filter(|t| !t.is_empty()),
            MessageContent::Parts(parts) => parts.iter().find_map(ContentPart::usable_text),
            MessageContent::Absent => None,
        }
    }
}

/// A single caller-supplied chat message.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: MessageContent,
}

/// A role-tagged message as sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpstreamMessage {
    pub role: Role,
    pub content: String,
}

impl UpstreamMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Decoded inbound request body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Vec<ChatMessage>,
}

impl ChatPayload {
    /// Decode any JSON value. Non-objects yield an empty payload.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    /// Resolve the user message to relay.
    ///
    /// A non-blank `message` wins. Otherwise `messages` is scanned from the
    /// end and the latest user entry with usable text is returned.
    pub fn user_message(&self) -> Option<&str> {
        if let Some(message) = self.message.as_deref().map(str::trim) {
            if !message.is_empty() {
                return Some(message);
            }
        }

        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == Some(Role::User))
            .find_map(|m| m.content.text())
    }

    /// The caller's messages that carry a role and usable text, in order.
    pub fn conversation(&self) -> Vec<UpstreamMessage> {
        self.messages
            .iter()
            .filter_map(|m| Some(UpstreamMessage::new(m.role?, m.content.text()?)))
            .collect()
    }
}

/// Turn a raw request body into JSON. An empty body is `{}`.
pub fn parse_body(raw: &[u8]) -> Result<Value, RelayError> {
    if raw.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(raw).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting malformed JSON body");
        RelayError::InvalidJson
    })
}

/// Deserialize a field, treating values of the wrong type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserialize `messages`, dropping entries that are not objects.
fn lenient_messages<'de, D>(deserializer: D) -> Result<Vec<ChatMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
