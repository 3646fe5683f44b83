use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Pre-register counters so they appear even before the first increment.
    counter!("trades_created_total").absolute(0);
    counter!("trades_closed_total").absolute(0);
    counter!("trades_deleted_total").absolute(0);
    counter!("chart_uploads_total").absolute(0);
    counter!("store_errors_total").absolute(0);
    counter!("refresh_superseded_total").absolute(0);
    counter!("market_data_requests_total").absolute(0);

    // Histogram is lazily created on first record; force creation.
    histogram!("stats_compute_seconds").record(0.0);

    Ok(handle)
}

/// Handle that renders into a private registry, for tests and for processes
/// where a global recorder is already installed.
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}
