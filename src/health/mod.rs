//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → One probe task per backend
//!     → state.rs (write flag, publish on transition)
//!
//! Out-of-band updates (admin API, process managers):
//!     → state.rs (same path)
//! ```
//!
//! # Design Decisions
//! - Status events are edge-triggered: repeated identical results are silent
//! - A failed probe only affects its own backend
//! - Health state is per-backend, not per-pool

pub mod active;
pub mod state;

pub use active::HealthMonitor;
pub use state::apply_health;
