//! Gateway error types.
//!
//! - [`TranslateError`]: the inbound payload could not be read as a gateway
//!   request. Surfaced to the caller as a plain 400 by the HTTP layer.
//! - [`DispatchError`]: the outbound call could not be made or failed in
//!   flight. Folded into the failure envelope, never propagated.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Inbound payload rejected before any outbound call is attempted.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("malformed gateway request: {0}")]
    InvalidField(#[source] serde_json::Error),
}

impl IntoResponse for TranslateError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

/// Failure to complete the single outbound call.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),

    #[error("invalid upstream path '{path}'")]
    InvalidPath {
        path: String,
        #[source]
        source: axum::http::uri::InvalidUri,
    },

    #[error("failed to encode request body")]
    EncodeBody(#[source] serde_json::Error),

    #[error("failed to build upstream request")]
    Build(#[source] axum::http::Error),

    #[error("upstream request failed")]
    Request(#[source] hyper_util::client::legacy::Error),

    #[error("failed to read upstream response body")]
    ReadBody(#[source] hyper::Error),
}

impl DispatchError {
    /// Human-readable description including every underlying cause.
    pub fn reason(&self) -> String {
        let mut reason = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            reason.push_str(": ");
            reason.push_str(&cause.to_string());
            source = cause.source();
        }
        reason
    }
}
