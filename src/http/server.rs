//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (CORS, request ID, tracing, timeout, body limit)
//! - Serve static assets under the configured mount
//! - Bind server to listener and drain on shutdown

use axum::{
    body::Bytes,
    http::uri::InvalidUri,
    extract::{DefaultBodyLimit, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::gateway::{self, Dispatcher};
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the gateway.
///
/// Owns the router and, through it, the outbound client. Dropping the server
/// releases the client's connection pool.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails only when the backend host/port do not form a URI authority.
    pub fn new(config: GatewayConfig) -> Result<Self, InvalidUri> {
        let state = AppState {
            dispatcher: Arc::new(Dispatcher::new(&config.backend)?),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/gateway", post(gateway_handler))
            .route("/ready", get(ready_handler))
            .with_state(state);

        if config.assets.enabled {
            let mount = config.assets.mount.trim_end_matches('/');
            router = router.nest_service(mount, ServeDir::new(&config.assets.dir));
        }

        router = router
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size));

        // Opt-in: without it the outbound call runs under client defaults only.
        if let Some(secs) = config.timeouts.request_secs {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(secs)));
        }

        router
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
    }

    /// The fully layered router, for serving elsewhere or driving in tests.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener until a
    /// shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = %self.config.backend.authority(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// `POST /gateway`: translate, forward once, wrap the outcome.
async fn gateway_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers).to_string();

    let call = match gateway::translate(&body) {
        Ok(call) => call,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejected gateway request");
            metrics::record_request("rejected", 400, start_time);
            return e.into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %call.method,
        path = %call.full_path,
        backend = %state.dispatcher.authority(),
        "Forwarding gateway request"
    );

    let envelope = gateway::forward(&state.dispatcher, &call).await;
    let outcome = if envelope.is_success() { "completed" } else { "failed" };
    metrics::record_request(outcome, envelope.status().as_u16(), start_time);

    envelope.into_response()
}

/// `GET /ready`.
async fn ready_handler() -> &'static str {
    "OK"
}
