//! CORS middleware.
//!
//! Answers preflight requests directly and stamps CORS headers onto every
//! other response, error responses included, so browser clients can always
//! read the body.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ORIGIN, VARY,
        },
        HeaderMap, HeaderValue, Method, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::config::CorsConfig;

pub const ALLOW_METHODS: &str = "POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Origin allow-list resolved from configuration.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    max_age_secs: u64,
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Self {
        Self {
            allowed_origins: config.allowed_origins.clone(),
            max_age_secs: config.max_age_secs,
        }
    }

    /// The origin to grant: the caller's own if listed, otherwise the first
    /// listed origin (which a browser will then refuse to match).
    pub fn allow_origin<'a>(&'a self, origin: Option<&'a str>) -> &'a str {
        match origin {
            Some(origin) if self.allowed_origins.iter().any(|o| o == origin) => origin,
            _ => self
                .allowed_origins
                .first()
                .map(String::as_str)
                .unwrap_or("*"),
        }
    }

    /// Write the CORS header set for a request carrying `origin`.
    pub fn apply(&self, origin: Option<&str>, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(self.allow_origin(origin)) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from(self.max_age_secs));
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }
}

pub async fn cors_middleware(
    State(policy): State<Arc<CorsPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    // Preflight never reaches the relay handler.
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    policy.apply(origin.as_deref(), response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CorsPolicy {
        CorsPolicy::from_config(&CorsConfig {
            allowed_origins: vec!["https://app.example".into(), "http://localhost:5173".into()],
            max_age_secs: 600,
        })
    }

    #[test]
    fn test_listed_origin_is_echoed() {
        assert_eq!(policy().allow_origin(Some("http://localhost:5173")), "http://localhost:5173");
    }

    #[test]
    fn test_unlisted_origin_gets_default() {
        assert_eq!(policy().allow_origin(Some("https://evil.example")), "https://app.example");
        assert_eq!(policy().allow_origin(None), "https://app.example");
    }

    #[test]
    fn test_apply_sets_full_header_set() {
        let mut headers = HeaderMap::new();
        policy().apply(Some("https://app.example"), &mut headers);

        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Authorization");
        assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "600");
        assert_eq!(headers[VARY], "Origin");
    }
}
