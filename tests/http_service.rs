//! End-to-end tests against a running service.

use logscope::config::{Config, RuntimeSetting};
use logscope::health::{HandlerKind, HandlerState};
use logscope::http::X_REQUEST_ID;

mod common;

#[tokio::test]
async fn test_health_degraded_then_unhealthy() {
    let service = common::start_service(Config::default()).await;
    let client = common::client();

    let res = client.get(service.url("/health")).send().await.expect("service unreachable");
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["handlers"]["console"], "available");
    assert_eq!(body["handlers"]["file"], "unavailable");

    service
        .state
        .health
        .registry()
        .report(HandlerKind::Console, HandlerState::Error);

    let res = client.get(service.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 503);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_healthy_with_durable_handler() {
    let mut config = Config::default();
    config.handlers.database_enabled = true;
    let service = common::start_service(config).await;

    let res = common::client().get(service.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_concurrent_requests_keep_their_own_context() {
    let service = common::start_service(Config::default()).await;
    let client = common::client();

    let mut handles = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        let url = service.url("/context");
        handles.push(tokio::spawn(async move {
            let id = format!("req-{i}");
            let res = client.get(url).header(X_REQUEST_ID, &id).send().await.unwrap();
            let echoed = res
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body: serde_json::Value = res.json().await.unwrap();
            (id, echoed, body)
        }));
    }

    for handle in handles {
        let (id, echoed, body) = handle.await.unwrap();
        assert_eq!(echoed.as_deref(), Some(id.as_str()));
        assert_eq!(body["requestId"], id.as_str());
    }

    let metric = service.state.monitor.get("GET /context").unwrap();
    assert_eq!(metric.count, 20);
}

#[tokio::test]
async fn test_traceparent_reaches_context() {
    let service = common::start_service(Config::default()).await;
    let res = common::client()
        .get(service.url("/context"))
        .header("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["traceId"], "4bf92f3577b34da6a3ce929d0e0e4736");
    assert_eq!(body["spanId"], "00f067aa0ba902b7");
}

#[tokio::test]
async fn test_edge_runtime_health_unavailable() {
    let mut config = Config::default();
    config.runtime = RuntimeSetting::Edge;
    let service = common::start_service(config).await;
    let client = common::client();

    let res = client.get(service.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 501);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "unavailable");

    // context propagation still works on the edge store
    let res = client
        .get(service.url("/context"))
        .header(X_REQUEST_ID, "edge-1")
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["requestId"], "edge-1");
}
