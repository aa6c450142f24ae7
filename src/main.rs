//! Chat relay server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                  CHAT RELAY                  │
//!                        │                                              │
//!   Browser request      │  ┌──────────┐   ┌────────┐   ┌───────────┐  │
//!   ─────────────────────┼─▶│request id│──▶│  cors  │──▶│  handler  │  │
//!                        │  │ + trace  │   │preflight│  │POST + body│  │
//!                        │  └──────────┘   └────────┘   └─────┬─────┘  │
//!                        │                                    ▼        │
//!                        │                              ┌───────────┐  │
//!                        │                              │  payload  │  │
//!                        │                              │ extraction│  │
//!                        │                              └─────┬─────┘  │
//!                        │                                    ▼        │
//!   { reply, ok }        │  ┌──────────┐                ┌───────────┐  │
//!   ◀────────────────────┼──│  reply   │◀───────────────│ upstream  │◀─┼──── Model API
//!                        │  │extractors│                │  client   │──┼───▶
//!                        │  └──────────┘                └───────────┘  │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use chat_relay::config::load_config;
use chat_relay::observability::init_logging;
use chat_relay::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "chat-relay")]
#[command(about = "CORS-enabled relay between browser chat clients and a model API", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.bind)?;

    init_logging(&config.observability);

    tracing::info!("chat-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        style = ?config.upstream.style,
        model = %config.upstream.model,
        allowed_origins = ?config.cors.allowed_origins,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.credentials.api_key.is_none() {
        tracing::warn!(
            primary_env = %config.credentials.primary_env,
            fallback_env = %config.credentials.fallback_env,
            "No upstream API key found; chat requests will fail with 500 until one is set"
        );
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.trigger_on_ctrl_c());

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
