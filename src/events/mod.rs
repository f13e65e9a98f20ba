//! Event feed subsystem.
//!
//! # Data Flow
//! ```text
//! Health transition (health::state)  ─┐
//!                                     ├→ broadcaster.rs (serialize once)
//! Routed request (http::proxy)       ─┘      → per-observer queue
//!                                            → http::websocket (one task per observer)
//!                                            → JSON text frame
//! ```
//!
//! # Design Decisions
//! - Delivery is best-effort; a failing observer is removed, never retried
//! - New observers receive the current health of every target first

pub mod broadcaster;
pub mod event;

pub use broadcaster::{Broadcaster, ObserverId, Payload, Subscription};
pub use event::{EventKind, StatusEvent};
