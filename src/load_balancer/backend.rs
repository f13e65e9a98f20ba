//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend target
//! - Carry its health flag as seen by the registry

use serde::Serialize;

/// A single backend target, as stored in and copied out of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendTarget {
    /// Base URL of the backend, without trailing slash. Unique within the pool.
    pub address: String,
    /// Whether the target currently receives traffic.
    pub healthy: bool,
}

impl BackendTarget {
    /// Create a new target.
    pub fn new(address: impl Into<String>, healthy: bool) -> Self {
        Self {
            address: address.into(),
            healthy,
        }
    }

    /// Full URL for a path (and optional query) on this backend.
    pub fn url_for(&self, path_and_query: &str) -> String {
        if path_and_query.starts_with('/') {
            format!("{}{}", self.address, path_and_query)
        } else {
            format!("{}/{}", self.address, path_and_query)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        let target = BackendTarget::new("http://127.0.0.1:8081", true);
        assert_eq!(target.url_for("/"), "http://127.0.0.1:8081/");
        assert_eq!(target.url_for("/a/b?x=1"), "http://127.0.0.1:8081/a/b?x=1");
        assert_eq!(target.url_for("status"), "http://127.0.0.1:8081/status");
    }
}
