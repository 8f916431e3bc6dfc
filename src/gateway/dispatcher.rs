//! Outbound dispatch against the fixed backend.
//!
//! # Responsibilities
//! - Resolve the method and target URI of an [`OutboundCall`]
//! - Keep the backend authority fixed: the caller's path only ever becomes
//!   the path-and-query component
//! - Send exactly one request through the pooled client (no retries)
//! - Buffer the full response for normalization

use axum::http::uri::{Authority, InvalidUri, PathAndQuery, Scheme};
use axum::http::{header, response, HeaderValue, Method, Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::BackendConfig;
use crate::gateway::error::DispatchError;
use crate::gateway::translator::OutboundCall;

/// Pooled keep-alive client shared by every request.
pub type HttpClient = Client<HttpConnector, Full<Bytes>>;

/// A fully buffered upstream response.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub parts: response::Parts,
    pub body: Bytes,
}

/// Sends outbound calls to the single configured backend.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: HttpClient,
    authority: Authority,
}

impl Dispatcher {
    /// Create a dispatcher with its own connection pool.
    pub fn new(backend: &BackendConfig) -> Result<Self, InvalidUri> {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self::with_client(client, backend)
    }

    pub fn with_client(client: HttpClient, backend: &BackendConfig) -> Result<Self, InvalidUri> {
        Ok(Self {
            client,
            authority: backend.parse_authority()?,
        })
    }

    /// `host:port` every call is sent to.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Build the hyper request for a call without sending it.
    pub fn build_request(&self, call: &OutboundCall) -> Result<Request<Full<Bytes>>, DispatchError> {
        let method = resolve_method(&call.method)?;

        let path_and_query: PathAndQuery =
            call.full_path
                .parse()
                .map_err(|source| DispatchError::InvalidPath {
                    path: call.full_path.clone(),
                    source,
                })?;
        let uri = Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
            .map_err(DispatchError::Build)?;

        let builder = Request::builder().method(method).uri(uri);
        let request = match &call.body {
            Some(body) => {
                let bytes = serde_json::to_vec(body).map_err(DispatchError::EncodeBody)?;
                builder
                    .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
                    .body(Full::new(Bytes::from(bytes)))
            }
            None => builder.body(Full::new(Bytes::new())),
        };
        request.map_err(DispatchError::Build)
    }

    /// Send the call and buffer the complete response.
    pub async fn dispatch(&self, call: &OutboundCall) -> Result<UpstreamResponse, DispatchError> {
        let request = self.build_request(call)?;

        tracing::debug!(
            method = %request.method(),
            uri = %request.uri(),
            has_body = call.body.is_some(),
            "Dispatching upstream call"
        );

        let response = self
            .client
            .request(request)
            .await
            .map_err(DispatchError::Request)?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(DispatchError::ReadBody)?
            .to_bytes();

        Ok(UpstreamResponse { parts, body })
    }
}

/// Only the standard methods are accepted; `Method::from_bytes` alone would
/// let any token through as an extension method.
fn resolve_method(name: &str) -> Result<Method, DispatchError> {
    let method = match name {
        "GET" => Method::GET,
        "HEAD" => Method::HEAD,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        "CONNECT" => Method::CONNECT,
        "OPTIONS" => Method::OPTIONS,
        "TRACE" => Method::TRACE,
        "PATCH" => Method::PATCH,
        _ => return Err(DispatchError::UnsupportedMethod(name.to_string())),
    };
    Ok(method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(&BackendConfig {
            host: "127.0.0.1".into(),
            port: 8080,
        })
        .unwrap()
    }

    fn call(method: &str, full_path: &str) -> OutboundCall {
        OutboundCall {
            method: method.into(),
            full_path: full_path.into(),
            body: None,
        }
    }

    #[tokio::test]
    async fn builds_uri_against_backend() {
        let request = dispatcher().build_request(&call("GET", "/search?q=a%20b")).unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().to_string(), "http://127.0.0.1:8080/search?q=a%20b");
        assert!(request.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn body_is_sent_as_json() {
        let mut call = call("POST", "/items");
        call.body = json!({"name": "widget"}).as_object().cloned();

        let request = dispatcher().build_request(&call).unwrap();
        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");

        let bytes = request.into_body().collect().await.unwrap().to_bytes();
        let sent: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(sent, json!({"name": "widget"}));
    }

    #[tokio::test]
    async fn unknown_method_fails() {
        let err = dispatcher().build_request(&call("FETCH", "/")).unwrap_err();
        assert!(matches!(err, DispatchError::UnsupportedMethod(ref m) if m == "FETCH"));
    }

    #[tokio::test]
    async fn unencoded_path_fails() {
        let err = dispatcher().build_request(&call("GET", "/a b")).unwrap_err();
        assert!(matches!(err, DispatchError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn path_cannot_replace_backend_authority() {
        let request = dispatcher()
            .build_request(&call("GET", "@10.9.8.7:9999/secret"))
            .unwrap();
        assert_eq!(request.uri().host(), Some("127.0.0.1"));
        assert_eq!(request.uri().port_u16(), Some(8080));
        assert_eq!(
            request.uri().path_and_query().map(|pq| pq.as_str()),
            Some("@10.9.8.7:9999/secret")
        );
    }

    #[tokio::test]
    async fn path_without_leading_slash_keeps_backend_port() {
        let request = dispatcher().build_request(&call("GET", "items")).unwrap();
        assert_eq!(request.uri().authority().map(|a| a.as_str()), Some("127.0.0.1:8080"));
        assert_eq!(request.uri().path(), "items");
    }

    #[test]
    fn ipv6_backend_is_bracketed() {
        let dispatcher = Dispatcher::new(&BackendConfig {
            host: "::1".into(),
            port: 3000,
        })
        .unwrap();
        assert_eq!(dispatcher.authority().as_str(), "[::1]:3000");
    }

    #[test]
    fn invalid_backend_host_is_rejected() {
        let backend = BackendConfig {
            host: "bad host".into(),
            port: 3000,
        };
        assert!(Dispatcher::new(&backend).is_err());
    }

    #[test]
    fn all_standard_methods_resolve() {
        for name in ["GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH"] {
            assert_eq!(resolve_method(name).unwrap().as_str(), name);
        }
    }
}
