//! Gateway core: request translation, dispatch, response normalization.
//!
//! # Data Flow
//! ```text
//! POST /gateway body (JSON)
//!     → translator.rs (GatewayRequest → OutboundCall)
//!     → dispatcher.rs (one call to the fixed backend, fully buffered)
//!     → normalizer.rs (UpstreamResponse | DispatchError → GatewayResponse)
//!     → envelope written back (200 completed / 400 failed)
//! ```
//!
//! # Design Decisions
//! - Exactly one outbound call per inbound request, no retries
//! - "success" means the backend answered, not that it answered 2xx
//! - Dispatch failures never escape as errors; they become envelopes

pub mod dispatcher;
pub mod error;
pub mod normalizer;
pub mod translator;

pub use dispatcher::{Dispatcher, UpstreamResponse};
pub use error::{DispatchError, TranslateError};
pub use normalizer::{failure, normalize, GatewayResponse};
pub use translator::{translate, GatewayRequest, OutboundCall};

/// Run one call through the dispatcher and wrap whatever happens.
pub async fn forward(dispatcher: &Dispatcher, call: &OutboundCall) -> GatewayResponse {
    match dispatcher.dispatch(call).await {
        Ok(upstream) => {
            tracing::debug!(
                status = upstream.parts.status.as_u16(),
                bytes = upstream.body.len(),
                "Upstream call completed"
            );
            normalize(&upstream)
        }
        Err(e) => {
            let envelope = failure(&e);
            tracing::warn!(
                method = %call.method,
                path = %call.full_path,
                error = %e.reason(),
                "Upstream call failed"
            );
            envelope
        }
    }
}
