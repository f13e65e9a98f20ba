//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend, one task per backend per cycle
//! - Write results into the pool, announcing transitions only

use axum::body::Body;
use axum::http::{header, Method, Request};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::events::Broadcaster;
use crate::health::state::apply_health;
use crate::http::client::UpstreamClient;
use crate::load_balancer::backend::BackendTarget;
use crate::load_balancer::pool::BackendPool;

pub struct HealthMonitor {
    pool: Arc<BackendPool>,
    events: Arc<Broadcaster>,
    config: HealthCheckConfig,
    client: UpstreamClient,
}

impl HealthMonitor {
    pub fn new(
        pool: Arc<BackendPool>,
        events: Arc<Broadcaster>,
        config: HealthCheckConfig,
        client: UpstreamClient,
    ) -> Self {
        Self {
            pool,
            events,
            config,
            client,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            path = %self.config.path,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every backend concurrently and wait for the cycle to finish.
    ///
    /// Returns the number of health transitions observed.
    pub async fn check_all(&self) -> usize {
        let timeout = Duration::from_secs(self.config.timeout_secs);
        let mut probes = JoinSet::new();

        for target in self.pool.snapshot() {
            let client = self.client.clone();
            let pool = self.pool.clone();
            let events = self.events.clone();
            let path = self.config.path.clone();

            probes.spawn(async move {
                let healthy = probe(&client, &target, &path, timeout).await;
                apply_health(&pool, &events, &target.address, healthy) == Some(true)
            });
        }

        let mut transitions = 0;
        while let Some(result) = probes.join_next().await {
            match result {
                Ok(true) => transitions += 1,
                Ok(false) => {}
                Err(e) => tracing::error!(error = %e, "Health probe task failed"),
            }
        }
        transitions
    }
}

/// Single liveness request. Any failure counts as unhealthy.
async fn probe(client: &UpstreamClient, target: &BackendTarget, path: &str, timeout: Duration) -> bool {
    let addr = &target.address;
    let request = match Request::builder()
        .method(Method::GET)
        .uri(target.url_for(path))
        .header(header::USER_AGENT, "health-balancer-probe")
        .body(Body::empty())
    {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to build health check request");
            return false;
        }
    };

    match time::timeout(timeout, client.request(request)).await {
        Ok(Ok(response)) => {
            let success = response.status().is_success();
            if success {
                tracing::debug!(addr = %addr, status = %response.status(), "Health check passed");
            } else {
                tracing::warn!(addr = %addr, status = %response.status(), "Health check failed: non-success status");
            }
            success
        }
        Ok(Err(e)) => {
            tracing::warn!(addr = %addr, error = %e, "Health check failed: connection error");
            false
        }
        Err(_) => {
            tracing::warn!(addr = %addr, "Health check failed: timeout");
            false
        }
    }
}
