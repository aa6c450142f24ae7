//! Shared utilities for integration testing.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use chat_relay::config::{ApiKey, RelayConfig};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// What the mock upstream saw on its last call.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<RecordedRequest>>>,
}

/// Handle to a running mock upstream.
pub struct MockUpstream {
    pub base_url: String,
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<RecordedRequest>>>,
}

#[allow(dead_code)]
impl MockUpstream {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.last.lock().unwrap().clone()
    }
}

async fn mock_handler(
    State(state): State<MockState>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    *state.last.lock().unwrap() = Some(RecordedRequest {
        path: uri.path().to_string(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    (
        state.status,
        [("content-type", "application/json")],
        state.body.clone(),
    )
        .into_response()
}

/// Start a programmable upstream on an ephemeral port that always answers
/// with `status` and `body`.
pub async fn start_mock_upstream(status: u16, body: impl Into<String>) -> MockUpstream {
    let calls = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(Mutex::new(None));
    let state = MockState {
        status: StatusCode::from_u16(status).unwrap(),
        body: body.into(),
        calls: calls.clone(),
        last: last.clone(),
    };

    let app = Router::new()
        .route("/", any(mock_handler))
        .route("/{*path}", any(mock_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream {
        base_url: format!("http://{}", addr),
        calls,
        last,
    }
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// An upstream that accepts connections but never answers. Keep the
/// returned listener alive for as long as the upstream should hang.
#[allow(dead_code)]
pub async fn silent_upstream() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    (listener, base_url)
}

/// Default config pointed at `base_url`, with a test key.
pub fn relay_config(base_url: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.upstream.base_url = base_url.to_string();
    config.credentials.api_key = ApiKey::new("sk-test");
    config
}

/// Drive one request through a router and decode the JSON body.
#[allow(dead_code)]
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

/// A POST with a JSON body and a browser origin.
#[allow(dead_code)]
pub fn post(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .header("origin", "http://localhost:5173")
        .body(body.into())
        .unwrap()
}
