//! Request translation.
//!
//! Turns the inbound "describe an HTTP call" payload into an [`OutboundCall`].
//! Pure: nothing here touches the network.

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::gateway::error::TranslateError;

pub const DEFAULT_METHOD: &str = "GET";
pub const DEFAULT_PATH: &str = "/";

/// Inbound gateway request as posted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GatewayRequest {
    pub method: Option<String>,
    pub path: Option<String>,
    pub query: Option<Map<String, Value>>,
    pub body: Option<Map<String, Value>>,
}

impl GatewayRequest {
    /// Parse a raw inbound body. Anything but a JSON object is rejected.
    pub fn from_slice(payload: &[u8]) -> Result<Self, TranslateError> {
        let value: Value = serde_json::from_slice(payload).map_err(TranslateError::InvalidJson)?;
        if !value.is_object() {
            return Err(TranslateError::NotAnObject);
        }
        serde_json::from_value(value).map_err(TranslateError::InvalidField)
    }
}

/// The call the gateway will make against the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundCall {
    /// Upper-cased, not yet validated.
    pub method: String,
    /// Path plus `?query` when a query object was supplied. Used verbatim.
    pub full_path: String,
    pub body: Option<Map<String, Value>>,
}

impl From<GatewayRequest> for OutboundCall {
    fn from(request: GatewayRequest) -> Self {
        let method = request
            .method
            .as_deref()
            .unwrap_or(DEFAULT_METHOD)
            .to_uppercase();

        let mut full_path = request.path.unwrap_or_else(|| DEFAULT_PATH.to_string());
        if let Some(query) = &request.query {
            // An empty object still appends the '?'.
            full_path.push('?');
            full_path.push_str(&encode_query(query));
        }

        Self {
            method,
            full_path,
            body: request.body,
        }
    }
}

/// Parse an inbound payload straight into an outbound call.
pub fn translate(payload: &[u8]) -> Result<OutboundCall, TranslateError> {
    GatewayRequest::from_slice(payload).map(OutboundCall::from)
}

/// Build `k1=v1&k2=v2` in the object's own key order.
///
/// Keys go out as given; values are stringified and percent-encoded as UTF-8
/// (space becomes `%20`).
pub fn encode_query(query: &Map<String, Value>) -> String {
    query
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&stringify(value))))
        .collect::<Vec<_>>()
        .join("&")
}

/// Strings are used as-is, everything else as compact JSON text.
fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}
