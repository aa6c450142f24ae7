//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! relay + http subsystems
//!     → tracing events with request_id fields
//!     → logging.rs (EnvFilter + fmt layer)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every relay log line
//! - Message and reply text only at debug level

pub mod logging;

pub use logging::init_logging;
