//! Router-level tests for the relay endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chat_relay::relay::NO_TEXT_PLACEHOLDER;
use chat_relay::HttpServer;
use serde_json::json;

mod common;

use common::{post, relay_config, send, start_mock_upstream};

fn router_for(config: chat_relay::RelayConfig) -> axum::Router {
    HttpServer::new(config).unwrap().router()
}

#[tokio::test]
async fn test_preflight_skips_body_and_upstream() {
    let upstream = start_mock_upstream(200, r#"{"output_text":"hi"}"#).await;
    let router = router_for(relay_config(&upstream.base_url));

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/")
        .header("origin", "http://localhost:3000")
        .body(Body::from("{definitely not json"))
        .unwrap();
    let (status, headers, body) = send(router, request).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, serde_json::Value::Null);
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:3000");
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type, Authorization");
    assert_eq!(headers["access-control-max-age"], "86400");
    assert_eq!(headers["vary"], "Origin");
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_non_post_is_rejected_with_cors() {
    let upstream = start_mock_upstream(200, r#"{"output_text":"hi"}"#).await;
    let router = router_for(relay_config(&upstream.base_url));

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .header("origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(router, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "error": "POST only" }));
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json() {
    let upstream = start_mock_upstream(200, r#"{"output_text":"hi"}"#).await;
    let router = router_for(relay_config(&upstream.base_url));

    let (status, headers, body) = send(router, post("{\"message\": ")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Body must be valid JSON." }));
    assert!(headers.contains_key("access-control-allow-origin"));
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_empty_body_has_no_message() {
    let upstream = start_mock_upstream(200, r#"{"output_text":"hi"}"#).await;
    let router = router_for(relay_config(&upstream.base_url));

    let (status, _, body) = send(router, post(Body::empty())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "I didn't receive a message.");
    assert!(body["hint"].as_str().unwrap().contains("messages"));
    assert_eq!(body["got"], json!({}));
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_messages_without_usable_user_entry() {
    let upstream = start_mock_upstream(200, r#"{"output_text":"hi"}"#).await;
    let router = router_for(relay_config(&upstream.base_url));

    let payload = json!({
        "messages": [
            { "role": "assistant", "content": "hello" },
            { "role": "user", "content": "   " }
        ]
    });
    let (status, _, body) = send(router, post(payload.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["got"], payload);
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_missing_key_never_calls_upstream() {
    let upstream = start_mock_upstream(200, r#"{"output_text":"hi"}"#).await;
    let mut config = relay_config(&upstream.base_url);
    config.credentials.api_key = None;
    let router = router_for(config);

    let (status, headers, body) = send(router, post(r#"{"message":"hello"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Missing upstream API key.");
    assert!(body["fix"].as_str().unwrap().contains("OPEN_AI_KEY"));
    assert!(headers.contains_key("access-control-allow-origin"));
    assert_eq!(upstream.calls(), 0);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let upstream = start_mock_upstream(500, r#"{"error":{"message":"server exploded"}}"#).await;
    let router = router_for(relay_config(&upstream.base_url));

    let (status, headers, body) = send(router, post(r#"{"message":"hello"}"#)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Upstream error");
    assert_eq!(body["status"], 500);
    assert_eq!(body["details"]["error"]["message"], "server exploded");
    assert!(headers.contains_key("access-control-allow-origin"));
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_upstream_plain_text_error_is_passed_through() {
    let upstream = start_mock_upstream(429, "slow down").await;
    let router = router_for(relay_config(&upstream.base_url));

    let (status, _, body) = send(router, post(r#"{"message":"hello"}"#)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 429);
    assert_eq!(body["details"], "slow down");
}

#[tokio::test]
async fn test_output_text_reply() {
    let upstream = start_mock_upstream(200, r#"{"output_text":"hi"}"#).await;
    let router = router_for(relay_config(&upstream.base_url));

    let (status, _, body) = send(router, post(r#"{"message":"  hello there  "}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "reply": "hi", "ok": true }));

    let seen = upstream.last_request().unwrap();
    assert_eq!(seen.path, "/v1/responses");
    assert_eq!(seen.authorization.as_deref(), Some("Bearer sk-test"));
    assert_eq!(seen.body["model"], "gpt-5");
    assert_eq!(seen.body["reasoning"]["effort"], "low");
    assert_eq!(seen.body["input"][0]["role"], "developer");
    assert_eq!(seen.body["input"][1], json!({ "role": "user", "content": "hello there" }));
    assert_eq!(seen.body["input"].as_array().unwrap().len(), 2);
    assert_eq!(upstream.calls(), 1);
}

#[tokio::test]
async fn test_chat_completion_reply_is_trimmed() {
    let upstream =
        start_mock_upstream(200, r#"{"choices":[{"message":{"content":"  hi  "}}]}"#).await;
    let mut config = relay_config(&upstream.base_url);
    config.upstream.style = chat_relay::config::UpstreamStyle::ChatCompletions;
    config.upstream.model = "gpt-4o-mini".into();
    let router = router_for(config);

    let payload = json!({
        "messages": [
            { "role": "user", "content": "first question" },
            { "role": "assistant", "content": "answer" },
            { "role": "user", "content": [{ "type": "text", "text": "latest question" }] }
        ]
    });
    let (status, _, body) = send(router, post(payload.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "reply": "hi", "ok": true }));

    let seen = upstream.last_request().unwrap();
    assert_eq!(seen.path, "/v1/chat/completions");
    assert_eq!(seen.body["model"], "gpt-4o-mini");
    assert_eq!(seen.body["temperature"], 0.7);
    assert_eq!(seen.body["messages"][0]["role"], "system");
    assert_eq!(seen.body["messages"][1]["content"], "latest question");
}

#[tokio::test]
async fn test_no_text_placeholder() {
    let upstream = start_mock_upstream(200, r#"{"id":"resp_123","output":[]}"#).await;
    let router = router_for(relay_config(&upstream.base_url));

    let (status, _, body) = send(router, post(r#"{"message":"hello"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], NO_TEXT_PLACEHOLDER);
}

#[tokio::test]
async fn test_non_json_success_body() {
    let upstream = start_mock_upstream(200, "<html>gateway</html>").await;
    let router = router_for(relay_config(&upstream.base_url));

    let (status, _, body) = send(router, post(r#"{"message":"hello"}"#)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 200);
    assert_eq!(body["details"], "<html>gateway</html>");
}

#[tokio::test]
async fn test_transport_failure() {
    let addr = common::closed_addr().await;
    let router = router_for(relay_config(&format!("http://{}", addr)));

    let (status, headers, body) = send(router, post(r#"{"message":"hello"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Upstream call failed");
    assert!(!body["details"].as_str().unwrap().is_empty());
    assert!(headers.contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_request_deadline_returns_json_with_cors() {
    let (_listener, base_url) = common::silent_upstream().await;
    let mut config = relay_config(&base_url);
    config.timeouts.request_secs = 1;
    let router = router_for(config);

    let (status, headers, body) = send(router, post(r#"{"message":"hello"}"#)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Upstream call failed");
    assert_eq!(body["details"], "No reply within the 1s request deadline");
    assert_eq!(headers["content-type"], "application/json");
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
}

#[tokio::test]
async fn test_forward_history() {
    let upstream = start_mock_upstream(200, r#"{"output_text":"ok"}"#).await;
    let mut config = relay_config(&upstream.base_url);
    config.upstream.forward_history = true;
    let router = router_for(config);

    let payload = json!({
        "messages": [
            { "role": "user", "content": "my name is Sam" },
            { "role": "assistant", "content": "Hi Sam" },
            { "role": "user", "content": "what is my name?" }
        ]
    });
    let (status, _, _) = send(router, post(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let input = upstream.last_request().unwrap().body["input"].clone();
    assert_eq!(
        input,
        json!([
            { "role": "developer", "content": chat_relay::config::schema::DEFAULT_PERSONA },
            { "role": "user", "content": "my name is Sam" },
            { "role": "assistant", "content": "Hi Sam" },
            { "role": "user", "content": "what is my name?" }
        ])
    );
}

#[tokio::test]
async fn test_unlisted_origin_gets_default_origin() {
    let upstream = start_mock_upstream(200, r#"{"output_text":"hi"}"#).await;
    let router = router_for(relay_config(&upstream.base_url));

    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("origin", "https://somewhere-else.example")
        .body(Body::from(r#"{"message":"hello"}"#))
        .unwrap();
    let (status, headers, _) = send(router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["access-control-allow-origin"], "https://willshacklett.github.io");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_oversized_body() {
    let upstream = start_mock_upstream(200, r#"{"output_text":"hi"}"#).await;
    let mut config = relay_config(&upstream.base_url);
    config.limits.max_body_size = 64;
    let router = router_for(config);

    let payload = json!({ "message": "x".repeat(200) });
    let (status, headers, body) = send(router, post(payload.to_string())).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["limit"], 64);
    assert!(headers.contains_key("access-control-allow-origin"));
    assert_eq!(upstream.calls(), 0);
}
