//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging → Build server → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C received → Shutdown::trigger → server stops accepting → drain → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
