//! Admin API.
//!
//! Lets operators and process managers inspect the pool and mark a backend
//! healthy or unhealthy out-of-band (for example right after starting it).

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use crate::http::server::AppState;
use self::auth::admin_auth_middleware;
use self::handlers::*;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/backends", get(get_backends))
        .route("/admin/backends/health", put(set_backend_health))
        .route_layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}
