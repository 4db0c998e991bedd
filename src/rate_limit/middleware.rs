//! Per-client-IP rate limiting for HTTP routes.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::rate_limit::fixed_window::FixedWindowLimiter;

/// Limiter plus the per-window allowance for each client.
pub struct HttpRateLimit {
    pub limiter: Arc<FixedWindowLimiter>,
    pub requests_per_interval: u32,
    pub enabled: bool,
}

/// Answers `429 Too Many Requests` with `Retry-After` once a client IP
/// exceeds its allowance.
pub async fn rate_limit_middleware(
    State(state): State<Arc<HttpRateLimit>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.enabled {
        return next.run(request).await;
    }

    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match state.limiter.check(state.requests_per_interval, &client) {
        Ok(_) => next.run(request).await,
        Err(exceeded) => {
            tracing::warn!(
                client = %client,
                limit = exceeded.limit,
                retry_after_secs = exceeded.retry_after_secs,
                "Rate limit exceeded"
            );
            exceeded.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(limit: u32) -> Router {
        let state = Arc::new(HttpRateLimit {
            limiter: Arc::new(FixedWindowLimiter::new("http", Duration::from_secs(3600), 100)),
            requests_per_interval: limit,
            enabled: true,
        });
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(state, rate_limit_middleware))
    }

    fn request_from(ip: [u8; 4]) -> Request<Body> {
        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((ip, 4000))));
        request
    }

    #[tokio::test]
    async fn test_limits_per_ip() {
        let app = app(1);

        let first = app.clone().oneshot(request_from([10, 0, 0, 1])).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.clone().oneshot(request_from([10, 0, 0, 1])).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key("retry-after"));

        let other = app.oneshot(request_from([10, 0, 0, 2])).await.unwrap();
        assert_eq!(other.status(), StatusCode::OK);
    }
}
