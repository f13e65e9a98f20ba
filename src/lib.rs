//! Health-aware round-robin HTTP load balancer with a live event feed.

pub mod config;
pub mod events;
pub mod http;
pub mod health;
pub mod load_balancer;
pub mod lifecycle;
pub mod observability;
pub mod admin;

pub use config::schema::BalancerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
