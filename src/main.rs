use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{info, warn};

use brute_guard::config::GuardConfig;
use brute_guard::guard::DecisionEngine;
use brute_guard::lists::MemoryListStore;
use brute_guard::logging;
use brute_guard::ratelimit::{CounterStore, Janitor};

/// Login brute-force throttling service.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = GuardConfig::load(args.config.as_deref())?;
    logging::init(&config.logging)?;

    info!("Starting Brute Guard");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!(
        login_limit = config.limits.login,
        password_limit = config.limits.password,
        ip_limit = config.limits.ip,
        janitor_frequency_secs = config.janitor.frequency_secs,
        "Configuration loaded"
    );

    let lists = Arc::new(MemoryListStore::with_entries(
        &config.lists.allow,
        &config.lists.deny,
    )?);
    let store = Arc::new(CounterStore::new());
    let engine = DecisionEngine::from_limits(lists, store.clone(), &config.limits)?;
    info!(thresholds = ?engine.thresholds(), "Decision engine initialized");

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let janitor = Janitor::new(store, config.janitor.frequency())?.spawn(async {
        let _ = stop_rx.await;
    });

    shutdown_signal().await;

    let _ = stop_tx.send(());
    let grace = config.shutdown.grace_period();
    match tokio::time::timeout(grace, janitor).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "Janitor task failed"),
        Err(_) => warn!(grace_secs = grace.as_secs(), "Janitor did not stop within grace period"),
    }

    info!("Brute Guard stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
