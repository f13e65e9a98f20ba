//! Upstream HTTP client shared by the proxy handler and the health monitor.

use axum::body::Body;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;

/// Pooled client used for every request to a backend.
pub type UpstreamClient = Client<HttpConnector, Body>;

/// Build the upstream client with a bounded connect time.
pub fn build_client(connect_timeout: Duration) -> UpstreamClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(connect_timeout));
    connector.set_nodelay(true);

    Client::builder(TokioExecutor::new()).build(connector)
}
