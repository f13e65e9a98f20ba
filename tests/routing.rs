//! End-to-end routing tests: rotation, skipping, fallback and failures.

use std::net::SocketAddr;
use std::time::Duration;

use health_balancer::config::FallbackPolicy;

mod common;

async fn get_body(balancer: SocketAddr, path: &str) -> (u16, String) {
    let res = common::http_client()
        .get(format!("http://{}{}", balancer, path))
        .send()
        .await
        .expect("Balancer unreachable");
    let status = res.status().as_u16();
    (status, res.text().await.unwrap())
}

#[tokio::test]
async fn test_round_robin_skips_unhealthy_backend() {
    let a = common::start_mock_backend("a").await;
    let b = common::start_mock_backend("b").await;
    let c = common::start_mock_backend("c").await;
    let (balancer, shutdown) =
        common::start_balancer(common::config_for(&[(a, true), (b, true), (c, true)])).await;

    let mut bodies = Vec::new();
    for _ in 0..4 {
        bodies.push(get_body(balancer, "/").await.1);
    }
    assert_eq!(bodies, vec!["a", "b", "c", "a"]);

    let res = common::set_health(balancer, b, false).await;
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["changed"], true);

    assert_eq!(get_body(balancer, "/").await.1, "c");
    assert_eq!(get_body(balancer, "/").await.1, "a");

    common::set_health(balancer, b, true).await;
    assert_eq!(get_body(balancer, "/").await.1, "b");

    shutdown.trigger();
}

#[tokio::test]
async fn test_forward_failure_is_service_unavailable() {
    let dead = common::closed_address().await;
    let (balancer, shutdown) = common::start_balancer(common::config_for(&[(dead, true)])).await;

    let (status, body) = get_body(balancer, "/anything").await;
    assert_eq!(status, 503);
    assert_eq!(body, "Backend server not available");

    shutdown.trigger();
}

#[tokio::test]
async fn test_no_retry_on_other_backend() {
    let dead = common::closed_address().await;
    let live = common::start_mock_backend("live").await;
    let (balancer, shutdown) =
        common::start_balancer(common::config_for(&[(dead, true), (live, true)])).await;

    assert_eq!(get_body(balancer, "/").await.0, 503);
    assert_eq!(get_body(balancer, "/").await, (200, "live".to_string()));

    shutdown.trigger();
}

#[tokio::test]
async fn test_all_unhealthy_falls_back_to_first_target() {
    let a = common::start_mock_backend("a").await;
    let b = common::start_mock_backend("b").await;
    let (balancer, shutdown) =
        common::start_balancer(common::config_for(&[(a, false), (b, false)])).await;

    for _ in 0..3 {
        assert_eq!(get_body(balancer, "/").await, (200, "a".to_string()));
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_reject_policy_when_all_unhealthy() {
    let a = common::start_mock_backend("a").await;
    let mut config = common::config_for(&[(a, false)]);
    config.routing.fallback = FallbackPolicy::Reject;
    let (balancer, shutdown) = common::start_balancer(config).await;

    let (status, body) = get_body(balancer, "/").await;
    assert_eq!(status, 503);
    assert_eq!(body, "No healthy backend available");

    shutdown.trigger();
}

#[tokio::test]
async fn test_path_and_query_forwarded_as_get() {
    let echo = common::start_echo_backend().await;
    let (balancer, shutdown) = common::start_balancer(common::config_for(&[(echo, true)])).await;

    let res = common::http_client()
        .post(format!("http://{}/static/app.js?v=3", balancer))
        .body("ignored")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "GET /static/app.js?v=3 HTTP/1.1");

    shutdown.trigger();
}

#[tokio::test]
async fn test_backend_status_passed_through() {
    let missing = common::start_programmable_backend(|| async { (404, "nope".to_string()) }).await;
    let (balancer, shutdown) = common::start_balancer(common::config_for(&[(missing, true)])).await;

    assert_eq!(get_body(balancer, "/missing").await, (404, "nope".to_string()));

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_echoed() {
    let a = common::start_mock_backend("a").await;
    let (balancer, shutdown) = common::start_balancer(common::config_for(&[(a, true)])).await;

    let res = common::http_client()
        .get(format!("http://{}/", balancer))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "abc-123");

    let res = common::http_client()
        .get(format!("http://{}/", balancer))
        .send()
        .await
        .unwrap();
    assert!(res.headers().contains_key("x-request-id"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_admin_api() {
    let a = common::start_mock_backend("a").await;
    let (balancer, shutdown) = common::start_balancer(common::config_for(&[(a, false)])).await;
    let client = common::http_client();

    let res = client
        .get(format!("http://{}/admin/backends", balancer))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 401);

    let res = client
        .get(format!("http://{}/admin/backends", balancer))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap();
    let backends: serde_json::Value = res.json().await.unwrap();
    assert_eq!(backends[0]["address"], format!("http://{}", a));
    assert_eq!(backends[0]["healthy"], false);

    let unknown = common::closed_address().await;
    assert_eq!(common::set_health(balancer, unknown, true).await.status(), 404);

    let body: serde_json::Value = common::set_health(balancer, a, true).await.json().await.unwrap();
    assert_eq!(body["changed"], true);
    let body: serde_json::Value = common::set_health(balancer, a, true).await.json().await.unwrap();
    assert_eq!(body["changed"], false);

    let status: serde_json::Value = client
        .get(format!("http://{}/admin/status", balancer))
        .bearer_auth(common::ADMIN_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["healthy_backends"], 1);
    assert_eq!(status["status"], "operational");

    shutdown.trigger();
}

#[tokio::test]
async fn test_broken_body_aborts_only_that_response() {
    let broken = common::start_truncated_backend().await;
    let good = common::start_mock_backend("good").await;
    let (balancer, shutdown) =
        common::start_balancer(common::config_for(&[(broken, true), (good, true)])).await;

    let res = common::http_client()
        .get(format!("http://{}/", balancer))
        .send()
        .await
        .expect("Balancer unreachable");
    assert_eq!(res.status().as_u16(), 200);
    assert!(res.text().await.is_err());

    assert_eq!(get_body(balancer, "/").await, (200, "good".to_string()));

    shutdown.trigger();
}

#[tokio::test]
async fn test_client_disconnect_cancels_forward() {
    let (stalled, hung_up) = common::start_stalled_backend().await;
    let (balancer, shutdown) = common::start_balancer(common::config_for(&[(stalled, true)])).await;

    let result = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap()
        .get(format!("http://{}/", balancer))
        .send()
        .await;
    assert!(result.is_err());

    // The forward timeout is far longer; only cancellation closes the upstream socket this soon.
    tokio::time::timeout(Duration::from_secs(3), hung_up)
        .await
        .expect("forward still running after client left")
        .unwrap();

    shutdown.trigger();
}
