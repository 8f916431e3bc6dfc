//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::net::Ipv6Addr;

use axum::http::uri::{Authority, InvalidUri};
use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream every gateway call is forwarded to.
    pub backend: BackendConfig,

    /// Static asset serving.
    pub assets: AssetsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Inbound request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:9000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9000".to_string(),
        }
    }
}

/// Backend target. Fixed for the lifetime of the process.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend host name or IP.
    pub host: String,

    /// Backend port.
    pub port: u16,
}

impl BackendConfig {
    /// Host as it appears in a URI: bare IPv6 literals get brackets.
    pub fn uri_host(&self) -> String {
        let host = self.host.trim();
        if host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", host)
        } else {
            host.to_string()
        }
    }

    /// `host:port` form used as the URI authority.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.uri_host(), self.port)
    }

    /// [`authority`](Self::authority) parsed as a URI authority.
    pub fn parse_authority(&self) -> Result<Authority, InvalidUri> {
        self.authority().parse()
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
        }
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Serve static files at all.
    pub enabled: bool,

    /// URL prefix the directory is mounted under.
    pub mount: String,

    /// Directory on disk.
    pub dir: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mount: "/assets".to_string(),
            dir: "assets".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Inbound request timeout in seconds. Unset means no timeout, so the
    /// outbound call is only bounded by the HTTP client's own defaults.
    pub request_secs: Option<u64>,
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:9000");
        assert_eq!(config.backend.authority(), "localhost:8080");
        assert_eq!(config.assets.mount, "/assets");
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn partial_section_keeps_remaining_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [backend]
            port = 3000
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.host, "localhost");
        assert_eq!(config.backend.port, 3000);
        assert_eq!(config.timeouts.request_secs, None);
    }

    #[test]
    fn request_timeout_is_opt_in() {
        let config: GatewayConfig = toml::from_str("[timeouts]\nrequest_secs = 5").unwrap();
        assert_eq!(config.timeouts.request_secs, Some(5));
        assert_eq!(GatewayConfig::default().timeouts.request_secs, None);
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let backend = BackendConfig {
            host: "::1".into(),
            port: 8080,
        };
        assert_eq!(backend.authority(), "[::1]:8080");
        let authority = backend.parse_authority().unwrap();
        assert_eq!(authority.host(), "[::1]");
        assert_eq!(authority.port_u16(), Some(8080));

        let bracketed = BackendConfig {
            host: "[::1]".into(),
            port: 9000,
        };
        assert_eq!(bracketed.authority(), "[::1]:9000");
    }
}
