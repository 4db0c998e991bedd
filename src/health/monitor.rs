//! Background store health monitoring.
//!
//! # Responsibilities
//! - Periodically refresh the connection status while the process is idle
//! - Stop on the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::config::HealthConfig;
use crate::store::ConnectionManager;

pub struct HealthMonitor {
    connection: Arc<ConnectionManager>,
    config: HealthConfig,
}

impl HealthMonitor {
    pub fn new(connection: Arc<ConnectionManager>, config: HealthConfig) -> Self {
        Self { connection, config }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.monitor_enabled {
            tracing::info!("Background health monitor disabled");
            return;
        }
        if !self.connection.is_configured() {
            tracing::info!("No store configured, health monitor not started");
            return;
        }

        tracing::info!(
            interval_secs = self.config.monitor_interval_secs,
            min_probe_interval_secs = self.config.min_interval_secs,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.monitor_interval_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let status = self.connection.check_health().await;
                    tracing::debug!(
                        connected = status.connected,
                        latency_ms = ?status.latency_ms,
                        "Store health refreshed"
                    );
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test(start_paused = true)]
    async fn test_monitor_probes_and_stops() {
        let connection = Arc::new(ConnectionManager::new(
            Some(Arc::new(MemoryStore::new())),
            Duration::from_secs(0),
        ));
        let config = HealthConfig {
            monitor_enabled: true,
            monitor_interval_secs: 5,
            min_interval_secs: 0,
        };
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(HealthMonitor::new(connection.clone(), config).run(rx));

        time::sleep(Duration::from_secs(1)).await;
        assert!(connection.is_connected());

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
