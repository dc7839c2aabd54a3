//! Metrics collection and Prometheus export.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder.
///
/// Safe to call more than once; only the first call installs a recorder.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .expect("failed to install Prometheus recorder")
    });
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_simulation_created(interstate: bool) {
    let jurisdiction = if interstate { "interstate" } else { "intrastate" };
    metrics::counter!("gst_simulations_created_total", "jurisdiction" => jurisdiction)
        .increment(1);
}

pub fn record_simulation_deleted() {
    metrics::counter!("gst_simulations_deleted_total").increment(1);
}

pub fn record_invoice_number_allocated() {
    metrics::counter!("gst_invoice_numbers_allocated_total").increment(1);
}

pub fn record_invoice_number_conflict() {
    metrics::counter!("gst_invoice_number_conflicts_total").increment(1);
}

pub fn record_gstin_rejected(role: &'static str) {
    metrics::counter!("gst_gstin_rejections_total", "role" => role).increment(1);
}
