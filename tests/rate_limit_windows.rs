//! Window rollover and quota behaviour through the composed services.

use resilience_layer::config::{QuotaConfig, ServiceConfig};
use resilience_layer::rate_limit::RateLimitExceeded;

mod common;

const MINUTE_MS: u64 = 60_000;
const HOUR_MS: u64 = 60 * MINUTE_MS;

#[test]
fn test_limit_plus_one_then_rollover() {
    let services = common::memory_only_services(ServiceConfig::default());
    let limiter = &services.api_limiter;
    let start = 10 * MINUTE_MS + 5;

    for _ in 0..5 {
        limiter.check_at(5, "token-a", start).unwrap();
    }
    let err: RateLimitExceeded = limiter.check_at(5, "token-a", start + 1).unwrap_err();
    assert_eq!(err.reset_at_ms, 11 * MINUTE_MS);
    assert_eq!(err.retry_after_secs, 60);

    assert_eq!(limiter.status_at(5, "token-a", start + 2).remaining, 0);
    assert!(limiter.check_at(5, "token-a", 11 * MINUTE_MS).is_ok());
}

#[test]
fn test_quota_admits_until_either_budget_runs_out() {
    let mut config = ServiceConfig::default();
    config.quota = QuotaConfig { hourly_limit: 6, daily_limit: 8, request_weight: 2 };
    let services = common::memory_only_services(config);
    let quota = &services.quota;

    for _ in 0..3 {
        quota.check_at("api-key", 0).unwrap();
    }
    let hourly_denial = quota.check_at("api-key", 1).unwrap_err();
    assert_eq!(hourly_denial.limit, 6);

    // The next hour has room, the day allows one more request.
    quota.check_at("api-key", HOUR_MS).unwrap();
    let daily_denial = quota.check_at("api-key", HOUR_MS + 1).unwrap_err();
    assert_eq!(daily_denial.limit, 8);
    assert_eq!(daily_denial.reset_at_ms, 24 * HOUR_MS);

    let status = quota.status_at("api-key", HOUR_MS + 2);
    assert_eq!(status.daily.used, 8);
    assert_eq!(status.daily.remaining, 0);
}

#[test]
fn test_sliding_window_defaults() {
    let services = common::memory_only_services(ServiceConfig::default());
    let limiter = &services.sliding_window;

    for i in 0..1000 {
        assert!(limiter.is_allowed_at("client", i));
    }
    assert!(!limiter.is_allowed_at("client", 1000));
    assert!(limiter.is_allowed_at("client", HOUR_MS + 1));
}

#[test]
fn test_sweeper_bounds_tracked_state() {
    let services = common::memory_only_services(ServiceConfig::default());
    for i in 0..20 {
        services.api_limiter.check_at(100, &format!("t{}", i), 0).unwrap();
        services.sliding_window.is_allowed_at(&format!("c{}", i), 0);
    }

    let removed = services.rate_limit_sweeper().sweep_all_at(2 * HOUR_MS);
    assert_eq!(removed, 40);
    assert_eq!(services.api_limiter.tracked_buckets(), 0);
}
