//! Round-robin load balancing strategy.

use crate::config::FallbackPolicy;
use crate::load_balancer::{pool::BackendPool, LoadBalancer, Selection};

/// Round-robin selector.
/// Rotates through the pool using its shared cursor, skipping unhealthy targets.
#[derive(Debug, Default)]
pub struct RoundRobin {
    fallback: FallbackPolicy,
}

impl RoundRobin {
    pub fn new(fallback: FallbackPolicy) -> Self {
        Self { fallback }
    }
}

impl LoadBalancer for RoundRobin {
    fn next_target(&self, pool: &BackendPool) -> Option<Selection> {
        let targets = pool.snapshot();
        let len = targets.len();
        if len == 0 {
            return None;
        }

        // At most one cursor step per target, so a fully unhealthy pool
        // still terminates after `len` inspections.
        let mut skipped = Vec::new();
        for _ in 0..len {
            let index = pool.next_index() % len;
            let target = &targets[index];
            if target.healthy {
                return Some(Selection {
                    target: target.clone(),
                    skipped,
                    degraded: false,
                });
            }
            skipped.push(target.address.clone());
        }

        match self.fallback {
            FallbackPolicy::FirstTarget => {
                tracing::warn!(
                    target_addr = %targets[0].address,
                    "All backends unhealthy, falling back to first target"
                );
                Some(Selection {
                    target: targets[0].clone(),
                    skipped,
                    degraded: true,
                })
            }
            FallbackPolicy::Reject => {
                tracing::warn!(backend_count = len, "All backends unhealthy, rejecting request");
                None
            }
        }
    }
}
