//! Admin API routing, authentication and rate limiting.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use resilience_layer::admin::setup_admin_router;
use resilience_layer::config::ServiceConfig;
use resilience_layer::store::MemoryStore;
use resilience_layer::Services;

mod common;

const KEY: &str = "test-admin-key";

fn config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.admin.api_key = KEY.to_string();
    config.rate_limit.interval_secs = 3600;
    config
}

fn app(services: Services) -> (Arc<Services>, Router) {
    let services = Arc::new(services);
    (services.clone(), setup_admin_router(services))
}

fn get(uri: &str, key: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, key)
}

fn request(method: Method, uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("Authorization", format!("Bearer {}", key));
    }
    let mut request = builder.body(Body::empty()).unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 50000))));
    request
}

async fn json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let (_, app) = app(common::memory_only_services(config()));

    let missing = app.clone().oneshot(get("/admin/status", None)).await.unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app.clone().oneshot(get("/admin/status", Some("nope"))).await.unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let ok = app.oneshot(get("/admin/status", Some(KEY))).await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body = json(ok).await;
    assert_eq!(body["store_configured"], false);
    assert_eq!(body["mode"], "memory");
    assert_eq!(body["lock_policy"], "fail_open");
}

#[tokio::test]
async fn test_health_and_cache_reports() {
    let store = MemoryStore::new();
    let (services, app) = app(common::memory_services(&store, config()));
    services.cache.set("k", &1u32, None).await;
    services.cache.get::<u32>("k").await;

    let health = json(app.clone().oneshot(get("/admin/health", Some(KEY))).await.unwrap()).await;
    assert_eq!(health["connected"], true);

    let cache = json(app.oneshot(get("/admin/cache", Some(KEY))).await.unwrap()).await;
    assert_eq!(cache["hits"], 1);
    assert_eq!(cache["mode"], "store");
}

#[tokio::test(start_paused = true)]
async fn test_local_cache_sweep_and_clear() {
    let (services, app) = app(common::memory_only_services(config()));
    services.cache.set("short", &1u32, Some(Duration::from_secs(1))).await;
    services.cache.set("long", &2u32, Some(Duration::from_secs(600))).await;
    tokio::time::advance(Duration::from_secs(2)).await;

    let swept = app
        .clone()
        .oneshot(request(Method::POST, "/admin/cache/sweep", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(swept.status(), StatusCode::OK);
    let body = json(swept).await;
    assert_eq!(body["removed"], 1);
    assert_eq!(body["local_entries"], 1);

    let unauthorized = app
        .clone()
        .oneshot(request(Method::DELETE, "/admin/cache/local", None))
        .await
        .unwrap();
    assert_eq!(unauthorized.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(services.cache.metrics().local_entries, 1);

    let cleared = json(
        app.oneshot(request(Method::DELETE, "/admin/cache/local", Some(KEY)))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(cleared["removed"], 1);
    assert_eq!(services.cache.metrics().local_entries, 0);
}

#[tokio::test]
async fn test_lock_peek() {
    let store = MemoryStore::new();
    let (services, app) = app(common::memory_services(&store, config()));
    services.job_lock.acquire("u1", "example.com", "job-1").await.unwrap();

    let response = app.clone().oneshot(get("/admin/locks/u1/example.com", Some(KEY))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["locked"], true);
    assert_eq!(body["job_id"], "job-1");

    let invalid = app.oneshot(get("/admin/locks/u:1/example.com", Some(KEY))).await.unwrap();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rate_limit_report() {
    let (services, app) = app(common::memory_only_services(config()));
    services.api_limiter.check(100, "tok").unwrap();
    services.quota.check("tok").unwrap();

    let body = json(app.oneshot(get("/admin/rate-limits/tok", Some(KEY))).await.unwrap()).await;
    assert_eq!(body["token"], "tok");
    assert_eq!(body["api"]["used"], 1);
    assert_eq!(body["quota"]["hourly"]["used"], 2);
}

#[tokio::test]
async fn test_admin_clients_are_rate_limited() {
    let mut config = config();
    config.rate_limit.admin_requests_per_interval = 2;
    let (_, app) = app(common::memory_only_services(config));

    for _ in 0..2 {
        let ok = app.clone().oneshot(get("/admin/status", Some(KEY))).await.unwrap();
        assert_eq!(ok.status(), StatusCode::OK);
    }
    let limited = app.oneshot(get("/admin/status", Some(KEY))).await.unwrap();
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key("retry-after"));
}
