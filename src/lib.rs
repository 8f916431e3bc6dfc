//! JSON HTTP gateway library.
//!
//! Accepts a JSON description of an HTTP call on `POST /gateway`, performs it
//! against one fixed backend and answers with a normalized JSON envelope.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use gateway::{GatewayRequest, GatewayResponse, OutboundCall};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
