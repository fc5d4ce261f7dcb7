//! lectern HTTP server.
//!
//! Loads the persisted index unit, verifies it, constructs the retrieval
//! engine, and serves the query API. A missing or misaligned index is fatal:
//! the process refuses to bind the listener rather than serve unverified
//! state.

use anyhow::{Context, Result};
use clap::Parser;

pub mod config;
pub mod handlers;
pub mod server;

use config::ServerConfig;
use server::Server;

#[tokio::main]
async fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    let server = Server::new(config).context("server startup failed")?;
    server.run().await
}
