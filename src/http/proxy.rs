//! Request forwarding.
//!
//! # Responsibilities
//! - Select a backend through the load balancer
//! - Announce the routing decision on the event feed before forwarding
//! - Forward as GET with the client's path and query
//! - Stream the backend's status, headers and body back unchanged
//!
//! # Design Decisions
//! - No retry against another backend: a failed forward is a 503
//! - A body that breaks mid-stream aborts the client response; nothing is resent
//! - Dropping the handler future (client went away) cancels the forward

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use futures_util::TryStreamExt;
use hyper::body::Incoming;
use std::time::{Duration, Instant};
use tokio::time;

use crate::events::StatusEvent;
use crate::http::request::X_REQUEST_ID;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Errors surfaced to the client by the proxy handler.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("No healthy backend available")]
    NoHealthyBackend,
    #[error("Backend server not available")]
    BackendUnavailable,
    #[error("Failed to build upstream request: {0}")]
    InvalidRequest(#[from] axum::http::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::NoHealthyBackend | ProxyError::BackendUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ProxyError::InvalidRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Main proxy handler.
/// Selects a backend, publishes the routing event and forwards the request.
pub async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();

    // 1. Select Backend
    let Some(selection) = state.balancer.next_target(&state.pool) else {
        metrics::record_request("none", StatusCode::SERVICE_UNAVAILABLE.as_u16(), start_time);
        return Err(ProxyError::NoHealthyBackend);
    };
    let backend = selection.target.address.clone();

    // 2. Announce
    state.events.publish(&StatusEvent::request(
        backend.clone(),
        selection.target.healthy,
        selection.skipped.clone(),
        Utc::now(),
    ));

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        path = %path,
        backend = %backend,
        skipped = selection.skipped.len(),
        degraded = selection.degraded,
        "Forwarding request"
    );

    // 3. Forward
    let mut upstream = Request::builder()
        .method(Method::GET)
        .uri(selection.target.url_for(&path));
    if let Some(id) = request.headers().get(X_REQUEST_ID) {
        upstream = upstream.header(X_REQUEST_ID, id.clone());
    }
    let upstream = upstream.body(Body::empty())?;

    let timeout = Duration::from_secs(state.config.timeouts.forward_secs);
    let response = match time::timeout(timeout, state.client.request(upstream)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "Error forwarding request");
            metrics::record_request(&backend, StatusCode::SERVICE_UNAVAILABLE.as_u16(), start_time);
            return Err(ProxyError::BackendUnavailable);
        }
        Err(_) => {
            tracing::error!(request_id = %request_id, backend = %backend, "Backend did not answer in time");
            metrics::record_request(&backend, StatusCode::SERVICE_UNAVAILABLE.as_u16(), start_time);
            return Err(ProxyError::BackendUnavailable);
        }
    };

    metrics::record_request(&backend, response.status().as_u16(), start_time);

    // 4. Relay
    let (parts, body) = response.into_parts();
    Ok(Response::from_parts(parts, relay_body(body, backend, request_id)))
}

/// Stream the backend body through, logging a mid-stream failure.
fn relay_body(body: Incoming, backend: String, request_id: String) -> Body {
    let stream = Body::new(body).into_data_stream().map_err(move |e| {
        tracing::error!(
            request_id = %request_id,
            backend = %backend,
            error = %e,
            "Error copying response body"
        );
        e
    });
    Body::from_stream(stream)
}
