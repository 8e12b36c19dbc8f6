use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus HTTP exporter. After this call, any metrics
/// recorded via the `metrics` crate macros are exported at /metrics.
pub fn init_metrics_server(port: u16) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()?;
    Ok(())
}

/// Per-symbol fetch outcome: "ok", "sentinel", "expected_miss", "error".
pub fn record_fetch(symbol: &str, outcome: &str) {
    counter!("price_fetch_total", "symbol" => symbol.to_string(), "outcome" => outcome.to_string())
        .increment(1);
}

/// Wall time of one full tick: fan-out, merge, and publish.
pub fn record_tick_latency_ms(latency_ms: f64) {
    histogram!("refresh_tick_latency_ms").record(latency_ms);
}

pub fn record_snapshot_size(items: usize) {
    histogram!("snapshot_items").record(items as f64);
}
