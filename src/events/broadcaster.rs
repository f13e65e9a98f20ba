//! Fan-out of status and request events to feed observers.
//!
//! # Responsibilities
//! - Hold the set of subscribed observers
//! - Queue a catch-up snapshot for each new observer
//! - Serialize each event once and push it to every observer
//! - Drop observers whose channel is closed or full
//!
//! # Design Decisions
//! - Each observer is a bounded mpsc queue drained by its own connection task
//! - Publishing never waits: `try_send` only, so a slow observer cannot stall
//!   the monitor or the request path
//! - Registration and publishing share one mutex, so every observer sees
//!   events in publish order and never misses one between snapshot and
//!   registration

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::events::event::StatusEvent;
use crate::load_balancer::pool::BackendPool;
use crate::observability::metrics;

/// Identity of a subscribed observer.
pub type ObserverId = Uuid;

/// An already serialized event.
pub type Payload = Arc<str>;

/// Handle returned to a new observer.
#[derive(Debug)]
pub struct Subscription {
    pub id: ObserverId,
    pub receiver: mpsc::Receiver<Payload>,
}

/// Registry of observers and the fan-out point for events.
#[derive(Debug)]
pub struct Broadcaster {
    observers: Mutex<HashMap<ObserverId, mpsc::Sender<Payload>>>,
    buffer: usize,
}

impl Broadcaster {
    /// Create a broadcaster whose observers may lag by `buffer` events.
    pub fn new(buffer: usize) -> Self {
        Self {
            observers: Mutex::new(HashMap::new()),
            buffer: buffer.max(1),
        }
    }

    /// Register a new observer and queue one status event per pool target.
    pub fn subscribe(&self, pool: &BackendPool) -> Subscription {
        let id = Uuid::new_v4();
        let mut observers = self.observers.lock();

        let snapshot = pool.snapshot();
        let (tx, receiver) = mpsc::channel(self.buffer + snapshot.len());
        for target in snapshot {
            if let Some(payload) = encode(&StatusEvent::status(target.address, target.healthy)) {
                // Fresh channel sized for the snapshot; this cannot be full.
                let _ = tx.try_send(payload);
            }
        }

        observers.insert(id, tx);
        metrics::record_observers(observers.len());
        tracing::debug!(observer = %id, observers = observers.len(), "Observer subscribed");

        Subscription { id, receiver }
    }

    /// Push an event to every observer. Returns how many observers accepted it.
    pub fn publish(&self, event: &StatusEvent) -> usize {
        let Some(payload) = encode(event) else {
            return 0;
        };

        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|id, tx| match tx.try_send(payload.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(observer = %id, "Observer too slow, dropping it");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(observer = %id, "Observer channel closed, dropping it");
                false
            }
        });

        let delivered = observers.len();
        if delivered != before {
            metrics::record_observers_dropped(before - delivered);
            metrics::record_observers(delivered);
        }
        metrics::record_event_published(event.message_type.as_str());
        delivered
    }

    /// Remove an observer. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.lock();
        let removed = observers.remove(&id).is_some();
        if removed {
            metrics::record_observers(observers.len());
            tracing::debug!(observer = %id, observers = observers.len(), "Observer unsubscribed");
        }
        removed
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }
}

fn encode(event: &StatusEvent) -> Option<Payload> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Arc::from(json)),
        Err(e) => {
            tracing::error!(error = %e, server = %event.server, "Failed to serialize event, dropping it");
            None
        }
    }
}
