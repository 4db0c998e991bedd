//! Bounded in-process fallback map.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

/// A locally held cache entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub serialized_value: String,
    pub created_at: Instant,
    pub ttl: Duration,
    seq: u64,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) < self.ttl
    }
}

/// Insertion order of live writes. Entries whose `seq` no longer matches the
/// map were overwritten or removed and are skipped.
#[derive(Debug, Default)]
struct InsertOrder {
    next_seq: u64,
    queue: VecDeque<(String, u64)>,
}

/// TTL-aware concurrent map. Reads go straight to DashMap. Inserts hold the
/// order lock so the capacity check and the write cannot interleave.
#[derive(Debug)]
pub struct LocalCache {
    entries: DashMap<String, CacheEntry>,
    order: Mutex<InsertOrder>,
    max_entries: usize,
}

impl LocalCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            order: Mutex::new(InsertOrder::default()),
            max_entries: max_entries.max(1),
        }
    }

    /// Fresh value for `key`. An expired entry is evicted.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let hit = self
            .entries
            .get(key)
            .and_then(|entry| entry.is_fresh(now).then(|| entry.serialized_value.clone()));

        if hit.is_none() {
            self.entries.remove_if(key, |_, entry| !entry.is_fresh(now));
        }
        hit
    }

    /// Store a value, making room first when the map is full.
    pub fn insert(&self, key: &str, serialized_value: String, ttl: Duration) {
        let mut order = self.order.lock().unwrap_or_else(PoisonError::into_inner);

        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            let swept = self.sweep_expired();
            if swept == 0 {
                self.evict_oldest(&mut order);
            }
        }

        let seq = order.next_seq;
        order.next_seq += 1;
        order.queue.push_back((key.to_string(), seq));
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                serialized_value,
                created_at: Instant::now(),
                ttl,
                seq,
            },
        );

        if order.queue.len() > self.max_entries.saturating_mul(2) {
            self.compact(&mut order);
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now));
        before.saturating_sub(self.entries.len())
    }

    fn evict_oldest(&self, order: &mut InsertOrder) {
        while let Some((key, seq)) = order.queue.pop_front() {
            if self.entries.remove_if(&key, |_, entry| entry.seq == seq).is_some() {
                tracing::debug!(key = %key, "Local cache full, evicting oldest entry");
                return;
            }
        }
    }

    fn compact(&self, order: &mut InsertOrder) {
        order.queue.retain(|(key, seq)| {
            self.entries
                .get(key)
                .is_some_and(|entry| entry.seq == *seq)
        });
    }

    /// Drop every entry. Returns how many were held.
    pub fn clear(&self) -> usize {
        let mut order = self.order.lock().unwrap_or_else(PoisonError::into_inner);
        let held = self.entries.len();
        self.entries.clear();
        order.queue.clear();
        held
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
