//! Backend pool management.
//!
//! # Responsibilities
//! - Own the fixed, ordered list of backend targets and their health flags
//! - Provide consistent snapshots to the router, monitor and event feed
//! - Own the rotation cursor used by round-robin selection
//!
//! # Design Decisions
//! - Health flags live behind a shared-read / exclusive-write lock
//! - The cursor is a separate atomic, so advancing it never contends with
//!   health reads or writes
//! - Membership is fixed: no add/remove after construction
//! - A flag change and its announcement are ordered by a separate
//!   transition lock, never by the targets lock (subscribers read the
//!   targets while holding the observer set)

use parking_lot::{Mutex, MutexGuard, RwLock};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::BackendConfig;
use crate::config::validation::normalize_address;
use crate::load_balancer::backend::BackendTarget;

/// Error type for pool construction.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("backend pool must contain at least one target")]
    Empty,
    #[error("duplicate backend address '{0}'")]
    Duplicate(String),
}

/// Shared registry of backend targets.
#[derive(Debug)]
pub struct BackendPool {
    targets: RwLock<Vec<BackendTarget>>,
    transitions: Mutex<()>,
    cursor: AtomicUsize,
}

impl BackendPool {
    /// Build a pool from `(address, initially_healthy)` pairs, in rotation order.
    pub fn new<I, S>(targets: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = (S, bool)>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut list = Vec::new();
        for (address, healthy) in targets {
            let address = normalize_address(address.as_ref()).to_string();
            if !seen.insert(address.clone()) {
                return Err(PoolError::Duplicate(address));
            }
            list.push(BackendTarget::new(address, healthy));
        }

        if list.is_empty() {
            return Err(PoolError::Empty);
        }

        Ok(Self {
            targets: RwLock::new(list),
            transitions: Mutex::new(()),
            cursor: AtomicUsize::new(0),
        })
    }

    /// Create a pool from backend configuration.
    pub fn from_config(configs: &[BackendConfig]) -> Result<Self, PoolError> {
        Self::new(configs.iter().map(|c| (c.address.as_str(), c.healthy)))
    }

    /// Number of targets. Fixed for the lifetime of the pool.
    pub fn len(&self) -> usize {
        self.targets.read().len()
    }

    /// Always false; an empty pool cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.targets.read().is_empty()
    }

    /// Ordered copy of every target and its health, from a single read lock.
    pub fn snapshot(&self) -> Vec<BackendTarget> {
        self.targets.read().clone()
    }

    /// Current health of one target, `None` if the address is not in the pool.
    pub fn is_healthy(&self, address: &str) -> Option<bool> {
        let address = normalize_address(address);
        self.targets
            .read()
            .iter()
            .find(|t| t.address == address)
            .map(|t| t.healthy)
    }

    /// Set one target's health flag.
    ///
    /// Returns `Some(true)` if the flag changed, `Some(false)` if it already
    /// held that value and `None` if the address is not in the pool.
    pub fn set_health(&self, address: &str, healthy: bool) -> Option<bool> {
        let address = normalize_address(address);
        let mut targets = self.targets.write();
        let target = targets.iter_mut().find(|t| t.address == address)?;
        let changed = target.healthy != healthy;
        target.healthy = healthy;
        Some(changed)
    }

    /// Serialize health writers.
    ///
    /// Hold the guard across `set_health` and whatever is published for the
    /// change, so announcements reach observers in the order the flag moved.
    pub fn lock_transitions(&self) -> MutexGuard<'_, ()> {
        self.transitions.lock()
    }

    /// Advance the rotation cursor, returning the value before the increment.
    pub fn next_index(&self) -> usize {
        self.cursor.fetch_add(1, Ordering::Relaxed)
    }

    /// Current cursor value, without advancing it.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Relaxed)
    }
}
