//! Backend health transitions.
//!
//! # Responsibilities
//! - Write a health flag into the pool
//! - Announce the change on the event feed, only when the flag flips
//!
//! Both the active monitor and out-of-band callers (the admin API, process
//! managers marking a freshly started backend healthy) go through here.

use chrono::Utc;

use crate::config::validation::normalize_address;
use crate::events::{Broadcaster, StatusEvent};
use crate::load_balancer::pool::BackendPool;
use crate::observability::metrics;

/// Record `healthy` for `address`.
///
/// Returns `Some(true)` when the flag changed (and a status event was
/// published), `Some(false)` when it already held that value and `None`
/// when the address is not in the pool.
pub fn apply_health(
    pool: &BackendPool,
    events: &Broadcaster,
    address: &str,
    healthy: bool,
) -> Option<bool> {
    let address = normalize_address(address);
    let _transition = pool.lock_transitions();
    let changed = pool.set_health(address, healthy)?;
    metrics::record_backend_health(address, healthy);

    if changed {
        if healthy {
            tracing::info!(addr = %address, "Backend is now healthy");
        } else {
            tracing::warn!(addr = %address, "Backend is now unhealthy");
        }
        metrics::record_health_transition(address);
        events.publish(&StatusEvent::transition(address, healthy, Utc::now()));
    }

    Some(changed)
}
