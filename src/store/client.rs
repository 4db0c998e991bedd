//! Key-value store abstraction.

use async_trait::async_trait;

use crate::store::types::StoreResult;

/// The primitives the cache and the job lock need from an external store.
///
/// Implementations must make `set_nx_ex` and `compare_and_delete` atomic on
/// the store side: the job lock relies on them for mutual exclusion across
/// processes.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Round-trip probe.
    async fn ping(&self) -> StoreResult<()>;

    /// Read a value.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value that expires after `ttl_secs`.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()>;

    /// Delete a key. Returns true if it existed.
    async fn del(&self, key: &str) -> StoreResult<bool>;

    /// Write `value` only if `key` is absent. Returns true if written.
    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<bool>;

    /// Delete `key` only if its current value equals `expected`.
    /// Returns true if deleted.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> StoreResult<bool>;

    /// Seconds until `key` expires; `None` if absent or without expiry.
    async fn ttl(&self, key: &str) -> StoreResult<Option<u64>>;

    /// Backend name for logs and status output.
    fn backend_name(&self) -> &'static str;
}
