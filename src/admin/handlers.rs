use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::cache::{CacheMode, MetricsSnapshot};
use crate::config::LockFailurePolicy;
use crate::health::ConnectionStatus;
use crate::lock::LockError;
use crate::rate_limit::{QuotaStatus, WindowStatus};
use crate::services::Services;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub store_configured: bool,
    pub store_connected: bool,
    pub mode: CacheMode,
    pub lock_policy: LockFailurePolicy,
}

#[derive(Serialize)]
pub struct RateLimitReport {
    pub token: String,
    pub api: WindowStatus,
    pub quota: QuotaStatus,
}

pub async fn get_status(State(services): State<Arc<Services>>) -> Json<SystemStatus> {
    let metrics = services.cache.metrics();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        store_configured: services.connection.is_configured(),
        store_connected: services.connection.is_connected(),
        mode: metrics.mode,
        lock_policy: services.job_lock.policy(),
    })
}

pub async fn get_health(State(services): State<Arc<Services>>) -> Json<ConnectionStatus> {
    Json(services.connection.check_health().await)
}

pub async fn get_cache(State(services): State<Arc<Services>>) -> Json<MetricsSnapshot> {
    Json(services.cache.metrics())
}

#[derive(Serialize)]
pub struct LocalCacheReport {
    pub removed: usize,
    pub local_entries: usize,
}

/// Drop every entry from the in-process fallback map.
pub async fn clear_local_cache(State(services): State<Arc<Services>>) -> Json<LocalCacheReport> {
    let removed = services.cache.clear_local();
    Json(LocalCacheReport { removed, local_entries: 0 })
}

/// Drop only expired entries from the in-process fallback map.
pub async fn sweep_local_cache(State(services): State<Arc<Services>>) -> Json<LocalCacheReport> {
    let removed = services.cache.sweep_local();
    Json(LocalCacheReport {
        removed,
        local_entries: services.cache.metrics().local_entries,
    })
}

pub async fn get_lock(
    State(services): State<Arc<Services>>,
    Path((user_id, domain)): Path<(String, String)>,
) -> Response {
    match services.job_lock.check(&user_id, &domain).await {
        Ok(status) => Json(status).into_response(),
        Err(e @ LockError::InvalidInput { .. }) => error_response(StatusCode::BAD_REQUEST, &e),
        Err(e) => error_response(StatusCode::SERVICE_UNAVAILABLE, &e),
    }
}

pub async fn get_rate_limit(
    State(services): State<Arc<Services>>,
    Path(token): Path<String>,
) -> Json<RateLimitReport> {
    let limit = services.config.rate_limit.default_limit;
    Json(RateLimitReport {
        api: services.api_limiter.status(limit, &token),
        quota: services.quota.status(&token),
        token,
    })
}

fn error_response(status: StatusCode, error: &LockError) -> Response {
    (status, Json(serde_json::json!({ "error": error.to_string() }))).into_response()
}
