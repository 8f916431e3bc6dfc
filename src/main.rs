//! JSON HTTP gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │                     GATEWAY                      │
//!                  │                                                  │
//!  POST /gateway   │  ┌──────────┐   ┌────────────┐   ┌────────────┐  │
//!  ────────────────┼─▶│   http   │──▶│ translator │──▶│ dispatcher │──┼──▶ Backend
//!                  │  │  server  │   └────────────┘   └─────┬──────┘  │   (fixed
//!                  │  └──────────┘                          │         │   host:port)
//!                  │       ▲          ┌────────────┐        │         │
//!  JSON envelope   │       └──────────│ normalizer │◀───────┘         │
//!  ◀───────────────┼──────────────────└────────────┘                  │
//!                  │                                                  │
//!                  │  /ready, /assets/*, CORS, request IDs, metrics   │
//!                  └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use json_gateway::config::{self, GatewayConfig};
use json_gateway::lifecycle::startup;
use json_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "json-gateway")]
#[command(about = "Forward JSON-described HTTP calls to a fixed backend", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend port (overrides `backend.port`).
    #[arg(short, long)]
    port: Option<u16>,

    /// Backend host (overrides `backend.host`).
    #[arg(long)]
    host: Option<String>,

    /// Listen address (overrides `listener.bind_address`).
    #[arg(short, long)]
    bind: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<GatewayConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => GatewayConfig::default(),
        };

        if let Some(port) = self.port {
            config.backend.port = port;
        }
        if let Some(host) = self.host {
            config.backend.host = host;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }

        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config()?;

    logging::init_logging(&config.observability);

    tracing::info!("json-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.authority(),
        assets = config.assets.enabled,
        request_timeout_secs = ?config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
