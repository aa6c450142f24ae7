//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (x-request-id)
//!     → cors.rs (preflight answered here, CORS headers on every response)
//!     → handler.rs (method gate, bounded body read)
//!     → relay subsystem
//!     → JSON response to client
//! ```

pub mod cors;
pub mod handler;
pub mod request;
pub mod server;

pub use cors::CorsPolicy;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
