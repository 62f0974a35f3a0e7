//! Prometheus recorder for pipeline counters.
//!
//! Metric names emitted by the collection run:
//! - `opphub_collection_runs_total`
//! - `opphub_collection_run_duration_seconds`
//! - `opphub_records_collected_total{category,status}`
//! - `opphub_duplicates_skipped_total{category}`
//! - `opphub_source_failures_total{category}`

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global recorder. Idempotent; later calls are no-ops.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_ok() {
                info!("Prometheus recorder installed");
            }
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    }
}

/// Current metrics in the Prometheus text format, if a recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}
