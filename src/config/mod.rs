//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overlay, credential resolution)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → shared via Arc with the relay and the CORS layer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - The upstream key is only ever read from the environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::{
    ApiKey, CorsConfig, CredentialsConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ReasoningEffort, RelayConfig, UpstreamConfig, UpstreamStyle,
};
pub use validation::{validate_config, ValidationError};
