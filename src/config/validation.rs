//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges (timeouts > 0, ports valid)
//! - Keep the asset mount from shadowing gateway routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

const RESERVED_PATHS: &[&str] = &["/gateway", "/ready"];

/// The backend must form an authority whose host is exactly the configured
/// host (no userinfo, path or port smuggled in through `host`).
fn check_backend_authority(config: &GatewayConfig, errors: &mut Vec<ValidationError>) {
    match config.backend.parse_authority() {
        Ok(authority)
            if authority.host() == config.backend.uri_host()
                && authority.port_u16() == Some(config.backend.port) => {}
        Ok(_) => errors.push(ValidationError::new(
            "backend.host",
            format!("'{}' is not a plain host name or IP address", config.backend.host),
        )),
        Err(e) => errors.push(ValidationError::new(
            "backend.host",
            format!("'{}' is not a valid authority: {}", config.backend.authority(), e),
        )),
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.backend.host.trim().is_empty() {
        errors.push(ValidationError::new("backend.host", "must not be empty"));
    } else {
        check_backend_authority(config, &mut errors);
    }
    if config.backend.port == 0 {
        errors.push(ValidationError::new("backend.port", "must be non-zero"));
    }

    if config.assets.enabled {
        let mount = config.assets.mount.as_str();
        if !mount.starts_with('/') {
            errors.push(ValidationError::new("assets.mount", "must start with '/'"));
        } else if mount.trim_end_matches('/').is_empty()
            || RESERVED_PATHS.contains(&mount.trim_end_matches('/'))
        {
            errors.push(ValidationError::new(
                "assets.mount",
                format!("'{}' collides with a gateway route", mount),
            ));
        }
    }

    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn reports_every_error() {
        let mut config = GatewayConfig::default();
        config.backend.host = "  ".into();
        config.backend.port = 0;
        config.timeouts.request_secs = Some(0);

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["backend.host", "backend.port", "timeouts.request_secs"]);
    }

    #[test]
    fn ipv6_backend_host_is_valid() {
        let mut config = GatewayConfig::default();
        config.backend.host = "::1".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn backend_host_must_be_a_plain_host() {
        let mut config = GatewayConfig::default();
        for host in ["user@evil", "example.com/path", "example.com:99", "bad host"] {
            config.backend.host = host.into();
            let errors = validate_config(&config).unwrap_err();
            assert_eq!(errors[0].field, "backend.host", "host {host}");
        }
    }

    #[test]
    fn asset_mount_cannot_shadow_gateway() {
        let mut config = GatewayConfig::default();
        config.assets.mount = "/gateway".into();
        assert!(validate_config(&config).is_err());

        config.assets.mount = "/".into();
        assert!(validate_config(&config).is_err());

        config.assets.mount = "static".into();
        assert!(validate_config(&config).is_err());

        // Disabled assets are not checked.
        config.assets.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
