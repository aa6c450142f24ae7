//! Request-level errors and their JSON rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

pub const USAGE_HINT: &str =
    r#"Send {"message":"..."} or {"messages":[{"role":"user","content":"..."}]}"#;

/// Everything that can end a relay request early.
///
/// Client errors map to 4xx, a missing credential or a failed transport to
/// 500, and a provider answering with a non-success status to 502.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("POST only")]
    MethodNotAllowed,

    #[error("Body exceeds {limit} bytes.")]
    BodyTooLarge { limit: usize },

    #[error("Body could not be read.")]
    UnreadableBody { details: String },

    #[error("Body must be valid JSON.")]
    InvalidJson,

    /// No usable user message; `got` echoes the decoded body.
    #[error("I didn't receive a message.")]
    NoMessage { got: Value },

    #[error("Missing upstream API key.")]
    MissingApiKey { fix: String },

    #[error("Upstream call failed")]
    Transport(#[source] reqwest::Error),

    /// The request deadline passed before a reply was ready.
    #[error("Upstream call failed")]
    DeadlineExceeded { secs: u64 },

    #[error("Upstream error")]
    Upstream { status: u16, details: Value },

    #[error("Upstream returned a body that is not JSON.")]
    UpstreamDecode { status: u16, details: String },
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::UnreadableBody { .. }
            | RelayError::InvalidJson
            | RelayError::NoMessage { .. } => StatusCode::BAD_REQUEST,
            RelayError::MissingApiKey { .. }
            | RelayError::Transport(_)
            | RelayError::DeadlineExceeded { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Upstream { .. } | RelayError::UpstreamDecode { .. } => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// JSON body sent to the caller.
    pub fn body(&self) -> Value {
        let error = self.to_string();
        match self {
            RelayError::MethodNotAllowed | RelayError::InvalidJson => json!({ "error": error }),
            RelayError::BodyTooLarge { limit } => json!({ "error": error, "limit": limit }),
            RelayError::UnreadableBody { details } => json!({ "error": error, "details": details }),
            RelayError::NoMessage { got } => json!({
                "error": error,
                "hint": USAGE_HINT,
                "got": got,
            }),
            RelayError::MissingApiKey { fix } => json!({ "error": error, "fix": fix }),
            RelayError::Transport(source) => json!({
                "error": error,
                "details": source.to_string(),
            }),
            RelayError::DeadlineExceeded { secs } => json!({
                "error": error,
                "details": format!("No reply within the {}s request deadline", secs),
            }),
            RelayError::Upstream { status, details } => json!({
                "error": error,
                "status": status,
                "details": details,
            }),
            RelayError::UpstreamDecode { status, details } => json!({
                "error": error,
                "status": status,
                "details": details,
            }),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
