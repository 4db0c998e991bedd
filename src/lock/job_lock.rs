//! Per-(user, domain) job lock.
//!
//! # Responsibilities
//! - Grant at most one live job per user and normalized domain
//! - Release only when the caller still owns the lock
//! - Apply the configured policy when the store cannot answer

use std::sync::Arc;
use std::time::Duration;

use crate::config::{LockConfig, LockFailurePolicy};
use crate::lock::domain::{lock_key, validate_job_id};
use crate::lock::types::{AcquireOutcome, LockError, LockStatus};
use crate::observability::metrics;
use crate::resilience::Backoff;
use crate::store::{ConnectionManager, KvStore, StoreResult};

pub struct JobLock {
    connection: Arc<ConnectionManager>,
    key_prefix: String,
    ttl_secs: u64,
    policy: LockFailurePolicy,
    backoff: Backoff,
}

impl JobLock {
    pub fn new(connection: Arc<ConnectionManager>, config: &LockConfig) -> Self {
        Self {
            connection,
            key_prefix: config.key_prefix.clone(),
            ttl_secs: config.ttl_secs,
            policy: config.on_store_failure,
            backoff: Backoff::from_lock_config(config),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn policy(&self) -> LockFailurePolicy {
        self.policy
    }

    /// Store key for a (user, domain) pair.
    pub fn key_for(&self, user_id: &str, domain: &str) -> Result<String, LockError> {
        lock_key(&self.key_prefix, user_id, domain)
    }

    /// Try to take the lock for `job_id`.
    ///
    /// Contention is a normal outcome carrying the current owner. Only
    /// invalid input or a store failure under a strict policy is an error.
    pub async fn acquire(
        &self,
        user_id: &str,
        domain: &str,
        job_id: &str,
    ) -> Result<AcquireOutcome, LockError> {
        validate_job_id(job_id)?;
        let key = self.key_for(user_id, domain)?;

        let Some(client) = self.connection.get_client() else {
            return self
                .on_store_failure(None, &key, job_id, "no store configured".to_string())
                .await;
        };

        match self.try_acquire(client.as_ref(), &key, job_id).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => self.on_store_failure(Some(client), &key, job_id, e.to_string()).await,
        }
    }

    /// Delete the lock if `job_id` still owns it. Returns whether a lock
    /// was removed. Store errors are logged and reported as `false`; the
    /// TTL reclaims the key eventually.
    pub async fn release(&self, user_id: &str, domain: &str, job_id: &str) -> Result<bool, LockError> {
        validate_job_id(job_id)?;
        let key = self.key_for(user_id, domain)?;

        let Some(client) = self.connection.get_client() else {
            tracing::debug!(key = %key, "No store configured, nothing to release");
            return Ok(false);
        };

        match client.compare_and_delete(&key, job_id).await {
            Ok(true) => {
                tracing::info!(key = %key, job_id, "Job lock released");
                metrics::record_lock_operation("release", "released");
                Ok(true)
            }
            Ok(false) => {
                tracing::debug!(key = %key, job_id, "Lock absent or owned by another job");
                metrics::record_lock_operation("release", "not_owner");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(key = %key, job_id, error = %e, "Failed to release job lock");
                metrics::record_lock_operation("release", "error");
                Ok(false)
            }
        }
    }

    /// Inspect the lock without changing it. An unreachable store reads as
    /// unlocked.
    pub async fn check(&self, user_id: &str, domain: &str) -> Result<LockStatus, LockError> {
        let key = self.key_for(user_id, domain)?;

        let Some(client) = self.connection.get_client() else {
            return Ok(LockStatus::free());
        };

        match client.get(&key).await {
            Ok(Some(job_id)) => {
                let ttl_remaining_secs = client.ttl(&key).await.unwrap_or_else(|e| {
                    tracing::debug!(key = %key, error = %e, "TTL lookup failed");
                    None
                });
                Ok(LockStatus {
                    locked: true,
                    job_id: Some(job_id),
                    ttl_remaining_secs,
                })
            }
            Ok(None) => Ok(LockStatus::free()),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Lock check failed, reporting unlocked");
                Ok(LockStatus::free())
            }
        }
    }

    async fn try_acquire(
        &self,
        client: &dyn KvStore,
        key: &str,
        job_id: &str,
    ) -> StoreResult<AcquireOutcome> {
        // Two rounds: the holder may expire between SET NX and GET.
        for _ in 0..2 {
            if client.set_nx_ex(key, job_id, self.ttl_secs).await? {
                tracing::info!(key, job_id, ttl_secs = self.ttl_secs, "Job lock acquired");
                metrics::record_lock_operation("acquire", "acquired");
                return Ok(AcquireOutcome::granted());
            }

            if let Some(existing) = client.get(key).await? {
                tracing::debug!(key, job_id, existing_job_id = %existing, "Job lock held");
                metrics::record_lock_operation("acquire", "contended");
                return Ok(AcquireOutcome::held_by(Some(existing)));
            }
        }

        metrics::record_lock_operation("acquire", "contended");
        Ok(AcquireOutcome::held_by(None))
    }

    async fn on_store_failure(
        &self,
        client: Option<Arc<dyn KvStore>>,
        key: &str,
        job_id: &str,
        error: String,
    ) -> Result<AcquireOutcome, LockError> {
        match self.policy {
            LockFailurePolicy::FailOpen => {
                tracing::warn!(key, job_id, error = %error, "Lock store unavailable, granting without lock");
                metrics::record_lock_operation("acquire", "fail_open");
                Ok(AcquireOutcome::fail_open())
            }
            LockFailurePolicy::FailClosed => {
                tracing::warn!(key, job_id, error = %error, "Lock store unavailable, denying");
                metrics::record_lock_operation("acquire", "fail_closed");
                Err(LockError::StoreUnavailable(error))
            }
            LockFailurePolicy::Retry => {
                let Some(client) = client else {
                    metrics::record_lock_operation("acquire", "fail_closed");
                    return Err(LockError::StoreUnavailable(error));
                };

                let mut last_error = error;
                for attempt in 1..=self.backoff.max_attempts {
                    let delay = self.backoff.delay(attempt);
                    tracing::debug!(key, attempt, delay_ms = delay.as_millis() as u64, "Retrying lock acquire");
                    tokio::time::sleep(delay).await;

                    match self.try_acquire(client.as_ref(), key, job_id).await {
                        Ok(outcome) => return Ok(outcome),
                        Err(e) => last_error = e.to_string(),
                    }
                }

                tracing::warn!(
                    key,
                    job_id,
                    attempts = self.backoff.max_attempts,
                    error = %last_error,
                    "Lock store unavailable after retries, denying"
                );
                metrics::record_lock_operation("acquire", "retries_exhausted");
                Err(LockError::StoreUnavailable(last_error))
            }
        }
    }
}
