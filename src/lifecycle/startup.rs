//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Bind the listener
//! - Build the server and run it until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Fatal startup or serving failure.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid address '{address}'")]
    Address {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("invalid backend authority '{authority}'")]
    Backend {
        authority: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    #[error("failed to install metrics exporter")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Serve(#[source] std::io::Error),
}

fn parse_addr(address: &str) -> Result<SocketAddr, StartupError> {
    address.parse().map_err(|source| StartupError::Address {
        address: address.to_string(),
        source,
    })
}

/// Start every subsystem and serve until a termination signal arrives.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    let authority = config.backend.authority();
    let server =
        HttpServer::new(config).map_err(|source| StartupError::Backend { authority, source })?;
    let config = server.config();

    if config.observability.metrics_enabled {
        metrics::init_metrics(parse_addr(&config.observability.metrics_address)?)?;
    }

    let bind_addr = parse_addr(&config.listener.bind_address)?;
    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_addr.to_string(),
            source,
        })?;

    tracing::info!(
        address = %listener.local_addr().map_err(StartupError::Serve)?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
