//! Framed RPC server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                 FRAMED-RPC SERVER             │
//!                      │                                               │
//!   Client frames      │  ┌─────────┐    ┌──────────┐   ┌──────────┐  │
//!   ──────────────────▶│  │   net   │───▶│  server  │──▶│ protocol │  │
//!                      │  │listener │    │ session  │   │ framing  │  │
//!                      │  └─────────┘    └────┬─────┘   └────┬─────┘  │
//!                      │                      │              │        │
//!                      │                      ▼              ▼        │
//!   Response frames    │                ┌──────────┐   ┌──────────┐  │
//!   ◀──────────────────┼────────────────│ protocol │◀──│ service  │  │
//!                      │                │   wire   │   │ process  │  │
//!                      │                └──────────┘   └──────────┘  │
//!                      │                                               │
//!                      │  cross-cutting: config, lifecycle, tracing    │
//!                      └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use framed_rpc::config::{load_config, ServerConfig};
use framed_rpc::lifecycle::{signals, Shutdown};
use framed_rpc::net::Listener;
use framed_rpc::{service, RpcServer};

#[derive(Parser)]
#[command(name = "framed-rpc")]
#[command(about = "Length-prefixed binary RPC server", long_about = None)]
struct Cli {
    /// Service to expose for this session
    service: String,

    /// Path to a TOML config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framed_rpc=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(selected) = service::create(&cli.service) else {
        eprintln!("unknown service: {}", cli.service);
        eprintln!("Available services:");
        for name in service::available() {
            eprintln!("        {}", name);
        }
        return ExitCode::FAILURE;
    };

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };

    tracing::info!(
        service = selected.name(),
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        max_body_length = config.protocol.max_body_length,
        "Configuration loaded"
    );

    let listener = match Listener::bind(&config.listener).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    signals::install(&shutdown);

    let server = RpcServer::new(config, selected);
    if let Err(e) = server.run(listener, shutdown).await {
        tracing::error!(error = %e, "Server failed");
        return ExitCode::FAILURE;
    }

    tracing::info!("Server stopped");
    ExitCode::SUCCESS
}
