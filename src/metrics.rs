/// Metrics Module - Prometheus Instrumentation
///
/// A one-shot CLI has no scrape endpoint, so the registry is rendered with
/// `gather_metrics` and can be dropped into a node-exporter textfile
/// directory at the end of a run (see `metrics.textfile` in the config).

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use lazy_static::lazy_static;
use crate::output::write_atomic;
use std::path::Path;
use std::time::Instant;

/// Standard latency buckets for histograms (seconds)
const LATENCY_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0];

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// RPC call duration
    /// Labels: method (eth_getBlockByNumber)
    pub static ref RPC_CALL_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new("blocktally_rpc_call_duration_seconds", "Time spent on provider RPC calls")
            .buckets(LATENCY_BUCKETS.to_vec()),
        &["method"]
    ).unwrap();

    /// RPC errors
    /// Labels: method, error_type (connection, rpc, malformed, not_found)
    pub static ref RPC_ERRORS: IntCounterVec = IntCounterVec::new(
        Opts::new("blocktally_rpc_errors_total", "Total provider RPC errors"),
        &["method", "error_type"]
    ).unwrap();

    /// Records decoded from input
    pub static ref RECORDS_DECODED: IntCounter = IntCounter::new(
        "blocktally_records_decoded_total",
        "Total full-width records decoded from input"
    ).unwrap();

    /// Transaction count of the last block written out
    pub static ref BLOCK_TRANSACTIONS: IntGauge = IntGauge::new(
        "blocktally_block_transactions",
        "Transaction count of the most recently queried block"
    ).unwrap();
}

/// Register all metrics with the global registry.
/// Call this once at start-up.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(RPC_CALL_DURATION.clone()))?;
    REGISTRY.register(Box::new(RPC_ERRORS.clone()))?;
    REGISTRY.register(Box::new(RECORDS_DECODED.clone()))?;
    REGISTRY.register(Box::new(BLOCK_TRANSACTIONS.clone()))?;
    Ok(())
}

/// Gather metrics in Prometheus text format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Write the text exposition to `path`, renamed into place so a
/// textfile collector never reads half a file
pub fn write_textfile(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = gather_metrics()?;
    write_atomic(path, text.as_bytes())?;
    Ok(())
}

/// Timer for measuring durations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn observe_rpc_duration(method: &str, secs: f64) {
    RPC_CALL_DURATION.with_label_values(&[method]).observe(secs);
}

pub fn increment_rpc_errors(method: &str, error_type: &str) {
    RPC_ERRORS.with_label_values(&[method, error_type]).inc();
}

pub fn increment_records_decoded(count: u64) {
    RECORDS_DECODED.inc_by(count);
}

pub fn set_block_transactions(count: i64) {
    BLOCK_TRANSACTIONS.set(count);
}
