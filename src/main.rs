//! Replica router daemon.
//!
//! Opens every configured replica group with the TCP driver, keeps their
//! health current with a heartbeat, and serves status over the admin API.
//!
//! ```text
//!   config.toml ─▶ groups ─▶ ReplicaSet (primary + replicas) ◀─ heartbeat
//!                                  │
//!                                  ▼
//!                   admin API (/admin/status, probe, heartbeat)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use replica_router::admin::{self, AppState};
use replica_router::config::loader::load_config;
use replica_router::driver::tcp::TcpDriver;
use replica_router::lifecycle::{signals, Shutdown};
use replica_router::observability::{logging, metrics};
use replica_router::GroupRegistry;

#[derive(Parser)]
#[command(name = "replica-router")]
#[command(about = "Health-checked read/write routing for primary/replica database groups", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "replica-router.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init(&config.observability.log_level);
    tracing::info!("replica-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        groups = config.groups.len(),
        heartbeat_enabled = config.heartbeat.enabled,
        heartbeat_interval_ms = config.heartbeat.interval_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let driver = TcpDriver::new(Duration::from_millis(config.driver.connect_timeout_ms));
    let registry = Arc::new(GroupRegistry::new());
    for group in &config.groups {
        let targets = group.targets.to_vec();
        if let Err(e) = registry.open_group(&driver, &group.name, &targets).await {
            tracing::error!(group = %group.name, error = %e, "Failed to open group");
            registry.close_all().await.ok();
            return Err(e.into());
        }
    }

    let heartbeat_interval = Duration::from_millis(config.heartbeat.interval_ms);
    if config.heartbeat.enabled {
        let started = registry.start_heartbeats(heartbeat_interval);
        tracing::info!(started, "Heartbeats running");
    }

    let shutdown = Shutdown::new();
    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AppState {
            registry: registry.clone(),
            api_key: config.admin.api_key.as_str().into(),
            heartbeat_interval,
        };
        Some(tokio::spawn(admin::serve(listener, state, shutdown.wait())))
    } else {
        None
    };

    signals::wait_for_shutdown().await;
    shutdown.trigger();

    if let Some(task) = admin_task {
        match task.await {
            Ok(Err(e)) => tracing::error!(error = %e, "Admin API failed"),
            Err(e) => tracing::error!(error = %e, "Admin API task panicked"),
            Ok(Ok(())) => {}
        }
    }

    if let Err(e) = registry.close_all().await {
        tracing::warn!(error = %e, "Some connections failed to close");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
