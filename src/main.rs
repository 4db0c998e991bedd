//! Resilience layer service.
//!
//! # Architecture Overview
//!
//! ```text
//!   callers ──▶ ResilientCache ──┐
//!   callers ──▶ JobLock ─────────┼──▶ ConnectionManager ──▶ Redis
//!                                │          │
//!                                │          └── health probe (throttled)
//!                                └──▶ LocalCache (fallback)
//!
//!   admin API ──▶ per-IP limiter ──▶ bearer auth ──▶ handlers
//!   background: HealthMonitor, RateLimitSweeper
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use resilience_layer::admin::setup_admin_router;
use resilience_layer::config::loader::load_with_env;
use resilience_layer::lifecycle::{join_tasks, wait_for_signal, Shutdown};
use resilience_layer::observability::{logging, metrics};
use resilience_layer::Services;

#[derive(Parser)]
#[command(name = "resilience-layer")]
#[command(about = "Cache, job lock and rate limiter service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_with_env(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "resilience-layer starting");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse::<SocketAddr>() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let services = Arc::new(Services::from_config(config));
    let shutdown = Shutdown::new();

    // Establish the initial connection state before serving.
    let status = services.connection.check_health().await;
    tracing::info!(connected = status.connected, "Initial store health check complete");

    let monitor = tokio::spawn(services.health_monitor().run(shutdown.subscribe()));
    let sweeper = tokio::spawn(services.rate_limit_sweeper().run(shutdown.subscribe()));

    if services.config.admin.enabled {
        let listener = TcpListener::bind(&services.config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");

        let app = setup_admin_router(services.clone());
        let mut stop = shutdown.subscribe();
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = wait_for_signal() => {}
                    _ = stop.recv() => {}
                }
            })
            .await?;
    } else {
        wait_for_signal().await;
    }

    shutdown.trigger();
    join_tasks(vec![("health_monitor", monitor), ("rate_limit_sweeper", sweeper)]).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
