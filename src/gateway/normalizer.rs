//! Response normalization.
//!
//! Every outcome of an outbound call becomes a [`GatewayResponse`] envelope.
//! A completed call is a success whatever the backend status was; the real
//! status only shows up in `status-code`.

use axum::http::{header, response, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::gateway::dispatcher::UpstreamResponse;
use crate::gateway::error::DispatchError;

pub const INVOCATION_FAILED: &str = "invocation failed";

/// The fixed JSON envelope returned to the gateway caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GatewayResponse {
    Completed(Completed),
    Failed(Failed),
}

/// The backend answered (with any status).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Completed {
    pub success: bool,
    pub body: String,
    pub status_code: u16,
    pub status_message: String,
    pub http_version: String,
    pub headers: Map<String, Value>,
}

/// The call could not be completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failed {
    pub success: bool,
    pub error: String,
    pub reason: String,
}

impl GatewayResponse {
    /// Outward status: 200 when the backend answered, 400 otherwise.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayResponse::Completed(_) => StatusCode::OK,
            GatewayResponse::Failed(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GatewayResponse::Completed(_))
    }
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        match serde_json::to_string_pretty(&self) {
            Ok(json) => (
                self.status(),
                [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                json,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode gateway envelope");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Envelope for a completed upstream call.
pub fn normalize(upstream: &UpstreamResponse) -> GatewayResponse {
    let parts = &upstream.parts;
    GatewayResponse::Completed(Completed {
        success: true,
        body: normalize_body(&parts.headers, &upstream.body),
        status_code: parts.status.as_u16(),
        status_message: status_message(parts),
        http_version: format!("{:?}", parts.version),
        headers: collect_headers(&parts.headers),
    })
}

/// Envelope for a call that never completed.
pub fn failure(err: &DispatchError) -> GatewayResponse {
    GatewayResponse::Failed(Failed {
        success: false,
        error: INVOCATION_FAILED.to_string(),
        reason: err.reason(),
    })
}

/// Pretty-print JSON bodies, pass everything else through as text.
///
/// A body that claims to be JSON but does not parse is passed through raw.
fn normalize_body(headers: &HeaderMap, body: &[u8]) -> String {
    let raw = || String::from_utf8_lossy(body).into_owned();

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    if !is_json {
        return raw();
    }

    match serde_json::from_slice::<Value>(body).and_then(|v| serde_json::to_string_pretty(&v)) {
        Ok(pretty) => pretty,
        Err(e) => {
            tracing::warn!(error = %e, "Upstream body declared as JSON failed to parse, passing through raw");
            raw()
        }
    }
}

/// Reason phrase the backend actually sent, else the canonical one.
fn status_message(parts: &response::Parts) -> String {
    if let Some(reason) = parts.extensions.get::<hyper::ext::ReasonPhrase>() {
        return String::from_utf8_lossy(reason.as_bytes()).into_owned();
    }
    parts.status.canonical_reason().unwrap_or_default().to_string()
}

/// Flatten headers; repeated names keep the last value seen.
fn collect_headers(headers: &HeaderMap) -> Map<String, Value> {
    let mut collected = Map::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected.insert(name.as_str().to_string(), Value::String(value));
    }
    collected
}
