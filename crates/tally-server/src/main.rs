//! Tally server binary
//!
//! Receives statement uploads from the web app, runs the ingestion
//! pipeline, and persists the results through the hosted platform.
//!
//! Usage:
//!   tally-server --port 8080                Run against the platform
//!   tally-server --no-auth                  Local dev: no auth, memory store
//!
//! Platform credentials come from the environment:
//!   TALLY_PLATFORM_URL    Base URL of the hosted platform
//!   TALLY_SERVICE_KEY     Service-role key for auth lookups and inserts

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tally_core::{MemoryStore, RestStore, Store};
use tally_server::{serve, AuthVerifier, PlatformVerifier, ServerConfig};

#[derive(Parser)]
#[command(name = "tally-server", about = "Statement ingestion API for Tally")]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Disable authentication and use an in-memory store (local development only)
    #[arg(long)]
    no_auth: bool,

    /// Comma-separated list of allowed CORS origins
    #[arg(long)]
    allowed_origins: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let allowed_origins: Vec<String> = cli
        .allowed_origins
        .as_deref()
        .map(|s| {
            s.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let config = ServerConfig {
        require_auth: !cli.no_auth,
        allowed_origins,
    };

    let (store, verifier): (Arc<dyn Store>, Option<Arc<dyn AuthVerifier>>) = if cli.no_auth {
        (Arc::new(MemoryStore::new()), None)
    } else {
        let base_url = std::env::var("TALLY_PLATFORM_URL")
            .context("TALLY_PLATFORM_URL must be set (or pass --no-auth for local development)")?;
        let service_key = std::env::var("TALLY_SERVICE_KEY")
            .context("TALLY_SERVICE_KEY must be set (or pass --no-auth for local development)")?;

        (
            Arc::new(RestStore::new(&base_url, &service_key)),
            Some(Arc::new(PlatformVerifier::new(&base_url, &service_key)) as Arc<dyn AuthVerifier>),
        )
    };

    serve(store, verifier, &cli.host, cli.port, config).await
}
