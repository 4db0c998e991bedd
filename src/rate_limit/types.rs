//! Rate limit results and the 429 signal.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Wall-clock milliseconds since the Unix epoch.
pub fn current_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Usage of one token inside the current window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowStatus {
    pub limit: u32,
    pub used: u32,
    pub remaining: u32,
    pub reset_at_ms: u64,
}

impl WindowStatus {
    pub fn new(limit: u32, used: u32, reset_at_ms: u64) -> Self {
        Self {
            limit,
            used,
            remaining: limit.saturating_sub(used),
            reset_at_ms,
        }
    }
}

/// Hourly and daily budgets of a quota token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    pub hourly: WindowStatus,
    pub daily: WindowStatus,
    pub request_weight: u32,
}

/// Returned when a request does not fit the budget. Maps to HTTP 429.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Rate limit exceeded: limit {limit}, retry in {retry_after_secs}s")]
pub struct RateLimitExceeded {
    pub limit: u32,
    pub reset_at_ms: u64,
    pub retry_after_secs: u64,
}

impl RateLimitExceeded {
    pub fn new(limit: u32, reset_at_ms: u64, now_ms: u64) -> Self {
        Self {
            limit,
            reset_at_ms,
            retry_after_secs: reset_at_ms.saturating_sub(now_ms).div_ceil(1000),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::TOO_MANY_REQUESTS
    }
}

impl IntoResponse for RateLimitExceeded {
    fn into_response(self) -> Response {
        let retry_after = HeaderValue::from(self.retry_after_secs);
        let mut response = (
            self.status_code(),
            Json(serde_json::json!({
                "error": "Rate limit exceeded",
                "limit": self.limit,
                "reset_at_ms": self.reset_at_ms,
                "retry_after_secs": self.retry_after_secs,
            })),
        )
            .into_response();
        response.headers_mut().insert(header::RETRY_AFTER, retry_after);
        response
    }
}
