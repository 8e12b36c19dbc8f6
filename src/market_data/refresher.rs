use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::future::join_all;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::catalog::{self, SymbolInfo};
use crate::market_data::change::percent_change;
use crate::market_data::client::{FetchError, PriceSource};
use crate::market_data::types::{FetchFailure, MarketItem, Snapshot};
use crate::metrics;

/// Spawn the refresh loop. Ticks once immediately, then every `interval`;
/// a selection change re-registers the interval and triggers an
/// out-of-cycle tick. The loop stops when the selection store is dropped.
///
/// Snapshots are published on the returned watch channel. When `failures`
/// is attached, every per-symbol failure is mirrored onto it (best-effort,
/// dropped if the observer lags).
pub fn spawn_refresher(
    client: Arc<dyn PriceSource>,
    selection_rx: watch::Receiver<Vec<String>>,
    interval: Duration,
    failures: Option<mpsc::Sender<FetchFailure>>,
) -> (watch::Receiver<Snapshot>, JoinHandle<()>) {
    let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
    let refresher = Refresher::new(client, snapshot_tx, failures);
    let handle = tokio::spawn(refresher.run(selection_rx, interval));
    (snapshot_rx, handle)
}

/// Owns the previous-price table and the displayed item list. All mutation
/// happens inside the spawned task, so ticks are strictly sequential: a
/// slow fan-out delays the next tick instead of overlapping it, and a late
/// result can never clobber a newer merge.
struct Refresher {
    client: Arc<dyn PriceSource>,
    snapshot_tx: watch::Sender<Snapshot>,
    failures: Option<mpsc::Sender<FetchFailure>>,
    /// Last good price per key, for change computation. Never exposed.
    previous_prices: HashMap<String, f64>,
    items: Vec<MarketItem>,
    /// Tick counter, stamped on logs for traceability.
    generation: u64,
}

impl Refresher {
    fn new(
        client: Arc<dyn PriceSource>,
        snapshot_tx: watch::Sender<Snapshot>,
        failures: Option<mpsc::Sender<FetchFailure>>,
    ) -> Self {
        Self {
            client,
            snapshot_tx,
            failures,
            previous_prices: HashMap::new(),
            items: Vec::new(),
            generation: 0,
        }
    }

    async fn run(mut self, mut selection_rx: watch::Receiver<Vec<String>>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let selected = selection_rx.borrow().clone();
                    self.run_tick(&selected).await;
                }
                changed = selection_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let selected = selection_rx.borrow_and_update().clone();
                    ticker.reset();
                    self.run_tick(&selected).await;
                }
            }
        }

        info!("selection store dropped, refresher stopping");
    }

    async fn run_tick(&mut self, selected: &[String]) {
        self.generation += 1;
        let started = Instant::now();
        self.publish(true, None);

        match self.refresh(selected).await {
            Ok(()) => self.publish(false, None),
            Err(err) => {
                // Stale beats blank: prior items stay visible.
                warn!(generation = self.generation, error = %err, "refresh tick failed");
                self.publish(false, Some(err.to_string()));
            }
        }

        metrics::record_tick_latency_ms(started.elapsed().as_secs_f64() * 1000.0);
        metrics::record_snapshot_size(self.items.len());
    }

    async fn refresh(&mut self, selected: &[String]) -> Result<()> {
        let entries: Vec<&'static SymbolInfo> = selected
            .iter()
            .filter_map(|key| catalog::lookup(key))
            .collect();

        // Full fan-out, bounded at MAX_SELECTED by the selection invariant.
        let fetches = entries.iter().map(|info| {
            let client = Arc::clone(&self.client);
            async move { (*info, client.fetch_price(info.symbol).await) }
        });
        let results = join_all(fetches).await;

        let mut candidates: HashMap<String, MarketItem> = HashMap::new();
        for (info, result) in results {
            match result {
                Ok(price) if price.is_finite() && price > 0.0 => {
                    let change =
                        percent_change(self.previous_prices.get(info.key).copied(), price);
                    self.previous_prices.insert(info.key.to_string(), price);
                    metrics::record_fetch(info.symbol, "ok");
                    candidates.insert(
                        info.key.to_string(),
                        MarketItem {
                            key: info.key.to_string(),
                            label: info.label.to_string(),
                            value: price,
                            change,
                        },
                    );
                }
                Ok(price) => {
                    // Upstream's "no data" sentinel; treated like a failure.
                    debug!(
                        generation = self.generation,
                        symbol = info.symbol,
                        price,
                        "discarding sentinel price"
                    );
                    metrics::record_fetch(info.symbol, "sentinel");
                }
                Err(err) => {
                    if err.is_expected() {
                        debug!(
                            generation = self.generation,
                            symbol = info.symbol,
                            "symbol not served upstream"
                        );
                        metrics::record_fetch(info.symbol, "expected_miss");
                    } else {
                        warn!(
                            generation = self.generation,
                            symbol = info.symbol,
                            error = %err,
                            "price fetch failed"
                        );
                        metrics::record_fetch(info.symbol, "error");
                    }
                    self.notify_failure(info, err);
                }
            }
        }

        self.merge(selected, candidates);
        Ok(())
    }

    /// Replace each displayed item with its successful candidate, keep it
    /// as-is when the fetch failed, append newly selected keys on their
    /// first success, and drop keys no longer selected. Output order is
    /// selection order.
    fn merge(&mut self, selected: &[String], mut candidates: HashMap<String, MarketItem>) {
        let mut next = Vec::with_capacity(selected.len());
        for key in selected {
            if let Some(item) = candidates.remove(key.as_str()) {
                next.push(item);
            } else if let Some(existing) = self.items.iter().find(|item| &item.key == key) {
                next.push(existing.clone());
            }
            // No candidate and nothing displayed yet: the key stays absent
            // until its first successful fetch.
        }
        self.items = next;
    }

    fn publish(&self, loading: bool, error: Option<String>) {
        self.snapshot_tx.send_replace(Snapshot {
            items: self.items.clone(),
            loading,
            error,
        });
    }

    fn notify_failure(&self, info: &SymbolInfo, error: FetchError) {
        let Some(tx) = &self.failures else { return };
        let event = FetchFailure {
            key: info.key.to_string(),
            symbol: info.symbol.to_string(),
            error,
        };
        let _ = tx.try_send(event);
    }
}
