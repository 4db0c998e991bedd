//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use resilience_layer::config::ServiceConfig;
use resilience_layer::store::{ConnectionManager, KvStore, MemoryStore, StoreError, StoreResult};
use resilience_layer::Services;

/// A store that is configured but never answers.
#[derive(Default)]
pub struct FailingStore {
    pub calls: AtomicU32,
}

impl FailingStore {
    fn fail<T>(&self, op: &'static str) -> StoreResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Timeout { op, timeout_ms: 500 })
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for FailingStore {
    async fn ping(&self) -> StoreResult<()> {
        self.fail("ping")
    }

    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        self.fail("get")
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> StoreResult<()> {
        self.fail("set_ex")
    }

    async fn del(&self, _key: &str) -> StoreResult<bool> {
        self.fail("del")
    }

    async fn set_nx_ex(&self, _key: &str, _value: &str, _ttl_secs: u64) -> StoreResult<bool> {
        self.fail("set_nx_ex")
    }

    async fn compare_and_delete(&self, _key: &str, _expected: &str) -> StoreResult<bool> {
        self.fail("compare_and_delete")
    }

    async fn ttl(&self, _key: &str) -> StoreResult<Option<u64>> {
        self.fail("ttl")
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}

/// Connection manager that probes on every call.
pub fn connection_to(store: Arc<dyn KvStore>) -> Arc<ConnectionManager> {
    Arc::new(ConnectionManager::new(Some(store), Duration::ZERO))
}

pub fn memory_services(store: &MemoryStore, config: ServiceConfig) -> Services {
    Services::with_connection(config, connection_to(Arc::new(store.clone())))
}

pub fn memory_only_services(config: ServiceConfig) -> Services {
    Services::with_connection(config, Arc::new(ConnectionManager::memory_only()))
}
