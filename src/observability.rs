use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: slot availability queries. Labels: result (open/closed/error).
pub const SLOT_QUERIES_TOTAL: &str = "jadwal_slot_queries_total";

/// Histogram: slot query latency in seconds.
pub const SLOT_QUERY_DURATION_SECONDS: &str = "jadwal_slot_query_duration_seconds";

/// Counter: reminder list scans.
pub const REMINDER_SCANS_TOTAL: &str = "jadwal_reminder_scans_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: reservations currently inside their payment-reminder window.
pub const REMINDERS_ACTIVE: &str = "jadwal_reminders_active";

/// Counter: reservations auto-cancelled after the payment window lapsed.
pub const AUTO_CANCELLATIONS_TOTAL: &str = "jadwal_auto_cancellations_total";

/// Gauge: studios with live schedulers.
pub const STUDIOS_ACTIVE: &str = "jadwal_studios_active";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
