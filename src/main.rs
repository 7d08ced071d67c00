//! JWT header-to-query proxy.
//!
//! ```text
//!   client ──▶ listener ──▶ [request id, trace, timeout] ──▶ header-to-query ──▶ upstream
//!                                                            │
//!                           Authorization: Bearer <t>  ──▶   ?jwt=<t>
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use jwt_header_to_query::config::validation::validate_config;
use jwt_header_to_query::config::{load_config, ConfigError, ProxyConfig};
use jwt_header_to_query::lifecycle::signals::trigger_on_signal;
use jwt_header_to_query::observability::{logging, metrics};
use jwt_header_to_query::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "jwt-header-to-query")]
#[command(about = "Proxy that moves a header credential into a query parameter", long_about = None)]
struct Cli {
    /// Path to a TOML or JSON config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,

    /// Override the upstream address.
    #[arg(long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(upstream) = cli.upstream {
        config.upstream.address = upstream;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability.log_level);
    tracing::info!("jwt-header-to-query v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(trigger_on_signal(shutdown));

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
