//! Relay endpoint handler.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, FailedToBufferBody},
        State,
    },
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;

use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::relay::RelayError;

/// Accepts `POST` with a chat payload on any path.
///
/// The body is buffered under the router's `DefaultBodyLimit`; the relay
/// itself runs under `timeouts.request_secs`.
pub async fn relay_handler(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = request_id(&headers);

    if method != Method::POST {
        tracing::debug!(request_id = %request_id, method = %method, "Rejecting non-POST request");
        return RelayError::MethodNotAllowed.into_response();
    }

    let limit = state.config.limits.max_body_size;
    let raw = match body {
        Ok(bytes) => bytes,
        Err(BytesRejection::FailedToBufferBody(FailedToBufferBody::LengthLimitError(_))) => {
            tracing::warn!(request_id = %request_id, limit, "Body over limit");
            return RelayError::BodyTooLarge { limit }.into_response();
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read body");
            return RelayError::UnreadableBody {
                details: e.body_text(),
            }
            .into_response();
        }
    };

    let secs = state.config.timeouts.request_secs;
    let deadline = Duration::from_secs(secs);
    let result = tokio::time::timeout(deadline, state.relay.handle(&request_id, &raw))
        .await
        .unwrap_or_else(|_| {
            tracing::error!(request_id = %request_id, deadline_secs = secs, "Request deadline exceeded");
            Err(RelayError::DeadlineExceeded { secs })
        });

    match result {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => {
            tracing::debug!(request_id = %request_id, status = %e.status_code(), error = %e, "Relay request failed");
            e.into_response()
        }
    }
}
