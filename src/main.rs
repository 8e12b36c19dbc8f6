mod catalog;
mod config;
mod market_data;
mod metrics;
mod selection;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use config::Config;
use market_data::client::HttpPriceClient;
use market_data::refresher::spawn_refresher;
use selection::Selection;

/// Buffer for the per-symbol failure observer; events beyond it are dropped.
const FAILURE_CHANNEL_BUFFER: usize = 64;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    metrics::init_metrics_server(config.metrics_port)?;

    info!(
        api_base = %config.api_base,
        catalog_size = catalog::AVAILABLE_SYMBOLS.len(),
        "market-snapshot starting"
    );

    let client = Arc::new(HttpPriceClient::new(&config.api_base, config.http_timeout)?);
    let (selection, selection_rx) = Selection::with_defaults();
    let (failure_tx, mut failure_rx) = mpsc::channel(FAILURE_CHANNEL_BUFFER);

    let (mut snapshot_rx, refresher_handle) = spawn_refresher(
        client,
        selection_rx,
        config.refresh_interval,
        Some(failure_tx),
    );

    let _snapshot_logger = tokio::spawn(async move {
        while snapshot_rx.changed().await.is_ok() {
            let snapshot = snapshot_rx.borrow().clone();
            if snapshot.loading {
                continue;
            }
            if let Some(err) = &snapshot.error {
                warn!(error = %err, "tick failed, showing previous data");
            }
            for item in &snapshot.items {
                info!(
                    symbol = %item.key,
                    value = item.value,
                    change = item.change,
                    "quote"
                );
            }
        }
    });

    let _failure_logger = tokio::spawn(async move {
        while let Some(failure) = failure_rx.recv().await {
            debug!(
                key = %failure.key,
                symbol = %failure.symbol,
                status = ?failure.error.status(),
                error = %failure.error,
                "fetch failure observed"
            );
        }
    });

    tokio::select! {
        res = refresher_handle => {
            match res {
                Ok(()) => warn!("refresher exited"),
                Err(err) => warn!(error = %err, "refresher task panicked"),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl-C, shutting down");
        }
    }

    drop(selection);
    Ok(())
}
