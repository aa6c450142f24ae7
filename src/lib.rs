//! Chat relay library.
//!
//! Accepts chat requests from browser clients, forwards them to a model
//! provider with a server-held API key, and answers `{ "reply": "...", "ok": true }`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
