//! In-process store with the same atomic semantics as Redis.
//!
//! Used for single-node development and tests. It is private to the process
//! and gives no cross-instance guarantee.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::store::client::KvStore;
use crate::store::types::{StoreError, StoreResult};

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// A thread-safe key-value store living in this process.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, StoredValue>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: while offline every operation fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner.iter().filter(|r| r.value().is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::NotConnected("memory store offline".into()))
        } else {
            Ok(())
        }
    }

    fn expiry(ttl_secs: u64) -> Option<Instant> {
        Some(Instant::now() + Duration::from_secs(ttl_secs))
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.ensure_online()
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.ensure_online()?;
        let now = Instant::now();
        // Drop the entry if it has expired, otherwise read it.
        self.inner.remove_if(key, |_, v| !v.is_live(now));
        Ok(self.inner.get(key).map(|r| r.value().value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()> {
        self.ensure_online()?;
        self.inner.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: Self::expiry(ttl_secs),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        self.ensure_online()?;
        let now = Instant::now();
        Ok(self.inner.remove(key).is_some_and(|(_, v)| v.is_live(now)))
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<bool> {
        self.ensure_online()?;
        let now = Instant::now();
        let fresh = StoredValue {
            value: value.to_string(),
            expires_at: Self::expiry(ttl_secs),
        };
        // The entry guard holds the shard lock, so check and write are atomic.
        match self.inner.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    Ok(false)
                } else {
                    occupied.insert(fresh);
                    Ok(true)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                Ok(true)
            }
        }
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> StoreResult<bool> {
        self.ensure_online()?;
        let now = Instant::now();
        Ok(self
            .inner
            .remove_if(key, |_, v| v.is_live(now) && v.value == expected)
            .is_some())
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<u64>> {
        self.ensure_online()?;
        let now = Instant::now();
        Ok(self.inner.get(key).and_then(|r| {
            let stored = r.value();
            match stored.expires_at {
                Some(at) if at > now => Some((at - now).as_secs()),
                _ => None,
            }
        }))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
