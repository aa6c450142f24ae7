//! Chat relay subsystem.
//!
//! # Data Flow
//! ```text
//! raw body bytes
//!     → payload.rs (JSON parse, shape decoding, user message resolution)
//!     → service.rs (credential check, conversation assembly)
//!     → upstream.rs (one POST to the model provider)
//!     → reply.rs (ordered reply extractors)
//!     → RelayReply { reply, ok } or RelayError
//! ```
//!
//! # Design Decisions
//! - Every request is independent; nothing is cached between requests
//! - Errors are terminal for the request and never retried
//! - The API key is never logged or returned

pub mod error;
pub mod payload;
pub mod reply;
pub mod service;
pub mod upstream;

pub use error::RelayError;
pub use payload::{ChatMessage, ChatPayload, ContentPart, MessageContent, Role, UpstreamMessage};
pub use reply::{extract_reply, NO_TEXT_PLACEHOLDER};
pub use service::{Relay, RelayReply};
pub use upstream::{UpstreamClient, UpstreamSetupError};
