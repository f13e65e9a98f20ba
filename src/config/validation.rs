//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate backend addresses and pool uniqueness
//! - Validate value ranges (intervals and timeouts > 0, addresses parse)
//! - Detect path collisions between the event feed and other routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::BalancerConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("backend pool is empty")]
    EmptyPool,
    #[error("invalid backend address '{address}': {reason}")]
    InvalidBackendAddress { address: String, reason: String },
    #[error("duplicate backend address '{0}'")]
    DuplicateBackend(String),
    #[error("invalid {field} '{value}'")]
    InvalidSocketAddress { field: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
    #[error("{field} must start with '/': '{value}'")]
    RelativePath { field: &'static str, value: String },
    #[error("event feed path '{0}' collides with the proxy root or the admin API")]
    EventPathCollision(String),
}

/// Strip the trailing slash so `http://a:1/` and `http://a:1` are the same target.
pub fn normalize_address(address: &str) -> &str {
    address.trim_end_matches('/')
}

/// Check that a backend address is an absolute plain-http base URL.
pub fn check_backend_address(address: &str) -> Result<Url, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidBackendAddress {
        address: address.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(address).map_err(|e| invalid(&e.to_string()))?;
    if url.scheme() != "http" {
        return Err(invalid("scheme must be http"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }
    Ok(url)
}

/// Validate a loaded configuration.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::EmptyPool);
    }

    let mut seen = HashSet::new();
    for backend in &config.backends {
        if let Err(e) = check_backend_address(&backend.address) {
            errors.push(e);
            continue;
        }
        let normalized = normalize_address(&backend.address);
        if !seen.insert(normalized.to_string()) {
            errors.push(ValidationError::DuplicateBackend(normalized.to_string()));
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidSocketAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidSocketAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let durations = [
        ("health_check.interval_secs", config.health_check.interval_secs),
        ("health_check.timeout_secs", config.health_check.timeout_secs),
        ("events.keepalive_secs", config.events.keepalive_secs),
        ("events.send_timeout_secs", config.events.send_timeout_secs),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.forward_secs", config.timeouts.forward_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (field, value) in durations {
        if value == 0 {
            errors.push(ValidationError::ZeroValue(field));
        }
    }

    if config.events.observer_buffer == 0 {
        errors.push(ValidationError::ZeroValue("events.observer_buffer"));
    }

    for (field, value) in [
        ("health_check.path", &config.health_check.path),
        ("events.path", &config.events.path),
    ] {
        if !value.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                field,
                value: value.clone(),
            });
        }
    }

    let feed = config.events.path.as_str();
    if feed == "/" || feed == "/admin" || feed.starts_with("/admin/") {
        errors.push(ValidationError::EventPathCollision(config.events.path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
