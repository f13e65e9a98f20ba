//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared state (pool, broadcaster, balancer, upstream client)
//! - Create Axum Router with the proxy, event feed and admin handlers
//! - Wire up middleware (tracing, request ID, timeout)
//! - Spawn the health monitor
//! - Serve until the shutdown signal fires

use axum::{
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin;
use crate::config::BalancerConfig;
use crate::events::Broadcaster;
use crate::health::HealthMonitor;
use crate::http::client::{build_client, UpstreamClient};
use crate::http::proxy::proxy_handler;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::websocket::ws_handler;
use crate::lifecycle::Shutdown;
use crate::load_balancer::{pool::{BackendPool, PoolError}, round_robin::RoundRobin, LoadBalancer};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<BackendPool>,
    pub events: Arc<Broadcaster>,
    pub balancer: Arc<dyn LoadBalancer>,
    pub client: UpstreamClient,
    pub config: Arc<BalancerConfig>,
    pub shutdown: Shutdown,
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: BalancerConfig, shutdown: Shutdown) -> Result<Self, PoolError> {
        let pool = Arc::new(BackendPool::from_config(&config.backends)?);
        for target in pool.snapshot() {
            metrics::record_backend_health(&target.address, target.healthy);
        }

        let state = AppState {
            pool,
            events: Arc::new(Broadcaster::new(config.events.observer_buffer)),
            balancer: Arc::new(RoundRobin::new(config.routing.fallback)),
            client: build_client(Duration::from_secs(config.timeouts.connect_secs)),
            config: Arc::new(config),
            shutdown,
        };

        let router = Self::build_router(&state);
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: &AppState) -> Router {
        let config = &state.config;

        let mut router = Router::new()
            .route(&config.events.path, get(ws_handler))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler));

        if config.admin.enabled() {
            router = router.merge(admin::setup_admin_router(state.clone()));
        } else {
            tracing::info!("Admin API disabled (no api_key configured)");
        }

        router.with_state(state.clone()).layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer())
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
        )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.state.pool.len(),
            events_path = %self.state.config.events.path,
            "HTTP server starting"
        );

        let monitor = HealthMonitor::new(
            self.state.pool.clone(),
            self.state.events.clone(),
            self.state.config.health_check.clone(),
            self.state.client.clone(),
        );
        let monitor_task = tokio::spawn(monitor.run(self.state.shutdown.subscribe()));

        let mut shutdown = self.state.shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        if let Err(e) = monitor_task.await {
            tracing::error!(error = %e, "Health monitor task failed");
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
