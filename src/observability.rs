use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: admission attempts. Labels: outcome (admitted, conflict, rejected).
pub const ADMISSIONS_TOTAL: &str = "courtd_admissions_total";

/// Counter: reservations removed by administrative cancellation.
pub const REMOVALS_TOTAL: &str = "courtd_removals_total";

/// Counter: recurring series expansions requested.
pub const SERIES_TOTAL: &str = "courtd_series_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Histogram: WAL group-commit flush duration in seconds.
pub const WAL_FLUSH_DURATION_SECONDS: &str = "courtd_wal_flush_duration_seconds";

/// Histogram: WAL group-commit batch size (events per flush).
pub const WAL_FLUSH_BATCH_SIZE: &str = "courtd_wal_flush_batch_size";

/// Install the Prometheus metrics exporter on the given port. No-op if port is
/// None. Embedding applications call this once at startup.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
