//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → pool.rs (snapshot of targets + health)
//!     → round_robin.rs (advance cursor, skip unhealthy, apply fallback)
//!     → Selection { target, skipped } handed to the proxy handler
//! ```
//!
//! # Design Decisions
//! - Load balancer is stateless; the pool owns health flags and the cursor
//! - Unhealthy backends are skipped, and every skip is reported
//! - Selection is bounded by the pool size

pub mod backend;
pub mod pool;
pub mod round_robin;

use crate::load_balancer::backend::BackendTarget;
use crate::load_balancer::pool::BackendPool;

/// Outcome of one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Target the request goes to.
    pub target: BackendTarget,
    /// Unhealthy targets passed over, in inspection order.
    pub skipped: Vec<String>,
    /// True when no healthy target existed and the fallback was used.
    pub degraded: bool,
}

/// Strategy for picking a backend from the pool.
pub trait LoadBalancer: Send + Sync {
    /// Pick the next target, or `None` if the request must be refused.
    fn next_target(&self, pool: &BackendPool) -> Option<Selection>;
}
