//! Redis-backed store.
//!
//! The connection is opened lazily so a Redis outage at startup never blocks
//! the process; every command carries a deadline.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager as RedisConnection;
use redis::{AsyncCommands, Script};
use tokio::sync::OnceCell;
use tokio::time;

use crate::store::client::KvStore;
use crate::store::types::{StoreError, StoreResult};

/// Deletes KEYS[1] only while it still holds ARGV[1].
const COMPARE_AND_DELETE: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Distributed store on top of a shared redis `ConnectionManager`.
pub struct RedisStore {
    client: redis::Client,
    connection: OnceCell<RedisConnection>,
    command_timeout: Duration,
    connect_timeout: Duration,
    release_script: Script,
}

impl RedisStore {
    /// Parse the connection string. Does not touch the network.
    pub fn open(
        url: &str,
        command_timeout: Duration,
        connect_timeout: Duration,
    ) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            command_timeout,
            connect_timeout,
            release_script: Script::new(COMPARE_AND_DELETE),
        })
    }

    /// Get the shared connection, establishing it on first use.
    /// A failed attempt leaves the cell empty so the next call retries.
    async fn connection(&self) -> StoreResult<RedisConnection> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                match time::timeout(self.connect_timeout, RedisConnection::new(self.client.clone())).await {
                    Ok(Ok(manager)) => {
                        tracing::info!(
                            timeout_ms = self.command_timeout.as_millis() as u64,
                            "Redis connection established"
                        );
                        Ok(manager)
                    }
                    Ok(Err(e)) => Err(StoreError::NotConnected(e.to_string())),
                    Err(_) => Err(StoreError::Timeout {
                        op: "connect",
                        timeout_ms: self.connect_timeout.as_millis() as u64,
                    }),
                }
            })
            .await?;
        Ok(manager.clone())
    }

    async fn run<T, F>(&self, op: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match time::timeout(self.command_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout {
                op,
                timeout_ms: self.command_timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let cmd = redis::cmd("PING");
        let pong: String = self.run("ping", cmd.query_async(&mut conn)).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::UnexpectedReply(pong))
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = self.run("get", conn.get(key)).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<()> {
        let mut conn = self.connection().await?;
        let _: () = self.run("set_ex", conn.set_ex(key, value, ttl_secs)).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.connection().await?;
        let removed: i64 = self.run("del", conn.del(key)).await?;
        Ok(removed > 0)
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl_secs: u64) -> StoreResult<bool> {
        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("NX").arg("EX").arg(ttl_secs);
        // "OK" when written, nil when the key already exists
        let reply: Option<String> = self.run("set_nx_ex", cmd.query_async(&mut conn)).await?;
        Ok(reply.is_some())
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> StoreResult<bool> {
        let mut conn = self.connection().await?;
        let mut invocation = self.release_script.key(key);
        invocation.arg(expected);
        let removed: i64 = self
            .run("compare_and_delete", invocation.invoke_async(&mut conn))
            .await?;
        Ok(removed > 0)
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<u64>> {
        let mut conn = self.connection().await?;
        let mut cmd = redis::cmd("TTL");
        cmd.arg(key);
        // -2: no such key, -1: no expiry
        let secs: i64 = self.run("ttl", cmd.query_async(&mut conn)).await?;
        Ok(u64::try_from(secs).ok())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
