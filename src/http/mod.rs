//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → event feed path? → websocket.rs (observer task)
//!     → otherwise        → proxy.rs (select backend, publish, forward)
//!                           → client.rs (upstream hyper client)
//!     → Stream response to client
//! ```

pub mod client;
pub mod proxy;
pub mod request;
pub mod server;
pub mod websocket;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
