use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use crate::health::apply_health;
use crate::http::server::AppState;
use crate::load_balancer::backend::BackendTarget;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub backends: usize,
    pub healthy_backends: usize,
    pub observers: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetHealthRequest {
    pub address: String,
    pub healthy: bool,
}

#[derive(Debug, Serialize)]
pub struct SetHealthResponse {
    pub address: String,
    pub healthy: bool,
    pub changed: bool,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let snapshot = state.pool.snapshot();
    let healthy_backends = snapshot.iter().filter(|t| t.healthy).count();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: if healthy_backends > 0 { "operational" } else { "degraded" },
        backends: snapshot.len(),
        healthy_backends,
        observers: state.events.observer_count(),
    })
}

pub async fn get_backends(State(state): State<AppState>) -> Json<Vec<BackendTarget>> {
    Json(state.pool.snapshot())
}

/// Out-of-band health update, e.g. from whatever just started the backend.
pub async fn set_backend_health(
    State(state): State<AppState>,
    Json(request): Json<SetHealthRequest>,
) -> Response {
    match apply_health(&state.pool, &state.events, &request.address, request.healthy) {
        Some(changed) => {
            tracing::info!(
                addr = %request.address,
                healthy = request.healthy,
                changed,
                "Backend health set via admin API"
            );
            Json(SetHealthResponse {
                address: request.address,
                healthy: request.healthy,
                changed,
            })
            .into_response()
        }
        None => (StatusCode::NOT_FOUND, "Unknown backend").into_response(),
    }
}
