//! API relay.
//!
//! ```text
//!     Client ──▶ /api/{path}?{query} ──▶ relay ──▶ {upstream}/api/{path}?{query}
//!            ◀── status, headers, body ◀──────────┘
//!            ◀── 502 {"error": "..."} when the upstream cannot be reached
//!
//!     Client ──▶ /health ──▶ {"status": "ok"}
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_relay::config::{apply_env_overrides, read_config, validate_config, ConfigError};
use api_relay::error::StartupError;
use api_relay::lifecycle::{signals, Shutdown};
use api_relay::observability::{logging, metrics};
use api_relay::{HttpServer, RelayConfig};

#[derive(Parser)]
#[command(name = "api-relay")]
#[command(about = "Forward /api requests to an upstream application server", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream base URL (overrides config and API_RELAY_UPSTREAM).
    #[arg(short, long)]
    upstream: Option<String>,

    /// Listen address (overrides config and API_RELAY_BIND).
    #[arg(short, long)]
    bind: Option<String>,
}

fn load(cli: &Cli) -> Result<RelayConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config);
    if let Some(upstream) = &cli.upstream {
        config.upstream.base_url = upstream.clone();
    }
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("api-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr).map_err(|e| StartupError::Metrics(e.to_string()))?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
