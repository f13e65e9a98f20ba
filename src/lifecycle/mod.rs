//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Stop monitor and observers → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - One broadcast channel fans the stop request out to every long-running task
//! - Background loops select on it rather than being aborted

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
