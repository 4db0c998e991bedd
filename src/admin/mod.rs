//! Admin HTTP API.
//!
//! # Routes
//! - `GET /admin/status`: version, store state, cache mode, lock policy
//! - `GET /admin/health`: store connection status (throttled probe)
//! - `GET /admin/cache`: cache metrics snapshot
//! - `DELETE /admin/cache/local`: empty the local fallback map
//! - `POST /admin/cache/sweep`: drop expired local entries
//! - `GET /admin/locks/{user_id}/{domain}`: job lock peek
//! - `GET /admin/rate-limits/{token}`: fixed-window and quota usage
//!
//! Requests pass the per-IP rate limit first, then bearer authentication.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::rate_limit::rate_limit_middleware;
use crate::services::Services;

pub fn setup_admin_router(services: Arc<Services>) -> Router {
    let rate_limit = Arc::new(services.admin_rate_limit());

    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/health", get(get_health))
        .route("/admin/cache", get(get_cache))
        .route("/admin/cache/local", delete(clear_local_cache))
        .route("/admin/cache/sweep", post(sweep_local_cache))
        .route("/admin/locks/{user_id}/{domain}", get(get_lock))
        .route("/admin/rate-limits/{token}", get(get_rate_limit))
        .layer(middleware::from_fn_with_state(services.clone(), admin_auth_middleware))
        .layer(middleware::from_fn_with_state(rate_limit, rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(services)
}
