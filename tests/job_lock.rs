//! Job idempotency lock scenarios.

use std::sync::Arc;
use std::time::Duration;

use resilience_layer::config::{LockConfig, LockFailurePolicy, ServiceConfig};
use resilience_layer::lock::{JobLock, LockError};
use resilience_layer::store::MemoryStore;

mod common;

fn lock_over(store: &MemoryStore) -> Arc<JobLock> {
    common::memory_services(store, ServiceConfig::default()).job_lock
}

#[tokio::test]
async fn test_acquire_release_reacquire() {
    let store = MemoryStore::new();
    let lock = lock_over(&store);

    let first = lock.acquire("u1", "example.com", "job-1").await.unwrap();
    assert!(first.acquired);

    let second = lock.acquire("u1", "example.com", "job-2").await.unwrap();
    assert!(!second.acquired);
    assert_eq!(second.existing_job_id.as_deref(), Some("job-1"));

    assert!(lock.release("u1", "example.com", "job-1").await.unwrap());

    let third = lock.acquire("u1", "example.com", "job-3").await.unwrap();
    assert!(third.acquired);
    assert!(!third.degraded);
}

#[tokio::test]
async fn test_concurrent_acquires_grant_exactly_one() {
    let store = MemoryStore::new();
    let lock = lock_over(&store);

    let mut handles = Vec::new();
    for i in 0..32 {
        let lock = lock.clone();
        handles.push(tokio::spawn(async move {
            lock.acquire("u1", "example.com", &format!("job-{}", i)).await.unwrap()
        }));
    }

    let mut granted = 0;
    for handle in handles {
        if handle.await.unwrap().acquired {
            granted += 1;
        }
    }
    assert_eq!(granted, 1);
}

#[tokio::test]
async fn test_equivalent_domains_share_one_lock() {
    let store = MemoryStore::new();
    let lock = lock_over(&store);

    assert!(lock.acquire("u1", "HTTPS://Example.com/", "job-1").await.unwrap().acquired);
    let other = lock.acquire("u1", "http://example.com", "job-2").await.unwrap();
    assert_eq!(other.existing_job_id.as_deref(), Some("job-1"));

    // Different users never contend.
    assert!(lock.acquire("u2", "example.com", "job-3").await.unwrap().acquired);
}

#[tokio::test]
async fn test_stale_owner_cannot_release_new_lock() {
    let store = MemoryStore::new();
    let lock = lock_over(&store);

    lock.acquire("u1", "example.com", "job-1").await.unwrap();
    assert!(!lock.release("u1", "example.com", "job-9").await.unwrap());

    let status = lock.check("u1", "example.com").await.unwrap();
    assert!(status.locked);
    assert_eq!(status.job_id.as_deref(), Some("job-1"));
}

#[tokio::test(start_paused = true)]
async fn test_crashed_holder_expires_after_ttl() {
    let store = MemoryStore::new();
    let lock = lock_over(&store);

    lock.acquire("u1", "example.com", "job-1").await.unwrap();
    tokio::time::sleep(Duration::from_secs(299)).await;
    assert!(!lock.acquire("u1", "example.com", "job-2").await.unwrap().acquired);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!lock.check("u1", "example.com").await.unwrap().locked);
    assert!(lock.acquire("u1", "example.com", "job-2").await.unwrap().acquired);
}

#[tokio::test]
async fn test_failing_store_follows_policy() {
    let store = Arc::new(common::FailingStore::default());
    let connection = common::connection_to(store.clone());

    let open = JobLock::new(connection.clone(), &LockConfig::default());
    let outcome = open.acquire("u1", "example.com", "job-1").await.unwrap();
    assert!(outcome.acquired);
    assert!(outcome.degraded);

    let closed = JobLock::new(
        connection,
        &LockConfig { on_store_failure: LockFailurePolicy::FailClosed, ..LockConfig::default() },
    );
    let err = closed.acquire("u1", "example.com", "job-1").await.unwrap_err();
    assert!(matches!(err, LockError::StoreUnavailable(_)));
}

#[tokio::test(start_paused = true)]
async fn test_retry_policy_attempts_then_denies() {
    let store = Arc::new(common::FailingStore::default());
    let config = LockConfig {
        on_store_failure: LockFailurePolicy::Retry,
        retry_attempts: 3,
        ..LockConfig::default()
    };
    let lock = JobLock::new(common::connection_to(store.clone()), &config);

    let err = lock.acquire("u1", "example.com", "job-1").await.unwrap_err();
    assert!(matches!(err, LockError::StoreUnavailable(_)));
    // One initial attempt plus three retries, each failing on SET NX.
    assert_eq!(store.call_count(), 4);
}

#[tokio::test]
async fn test_memory_only_deployment() {
    let services = common::memory_only_services(ServiceConfig::default());
    let outcome = services.job_lock.acquire("u1", "example.com", "job-1").await.unwrap();
    assert!(outcome.degraded);
    assert!(!services.job_lock.release("u1", "example.com", "job-1").await.unwrap());
}

#[tokio::test]
async fn test_invalid_input_never_reaches_store() {
    let store = Arc::new(common::FailingStore::default());
    let lock = JobLock::new(common::connection_to(store.clone()), &LockConfig::default());

    assert!(lock.acquire("u 1", "example.com", "job").await.is_err());
    assert!(lock.acquire("u1", "   ", "job").await.is_err());
    assert!(lock.release("u1", "example.com", "").await.is_err());
    assert!(lock.check("", "example.com").await.is_err());
    assert_eq!(store.call_count(), 0);
}
