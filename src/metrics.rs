use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register so the series appear before the first read.
    for call in ["marketCount", "markets", "marketEscrow", "totalSupply", "balanceOf"] {
        counter!("chain_reads_total", "call" => call).absolute(0);
        counter!("chain_read_failures_total", "call" => call).absolute(0);
    }

    gauge!("snapshot_markets_included").set(0.0);
    histogram!("snapshot_latency_seconds").record(0.0);

    Ok(handle)
}
