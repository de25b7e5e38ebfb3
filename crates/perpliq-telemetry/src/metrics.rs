//! Prometheus metrics for the liquidation handler.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a startup-time programming error.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, CounterVec, Encoder,
    HistogramVec, IntCounter, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Handler calls by operation and outcome.
/// Labels: operation (liquidation/adl), outcome (success/failure)
pub static HANDLER_CALLS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "perpliq_handler_calls_total",
        "Total handler calls by operation and outcome",
        &["operation", "outcome"]
    )
    .unwrap()
});

/// Handler rejections by reason.
pub static HANDLER_REJECTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "perpliq_handler_rejected_total",
        "Total handler calls aborted, by reason",
        &["operation", "reason"]
    )
    .unwrap()
});

/// Strategy invocations by strategy kind and order type.
pub static STRATEGY_DISPATCH_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "perpliq_strategy_dispatch_total",
        "Total strategy invocations",
        &["strategy", "order_type"]
    )
    .unwrap()
});

/// Compute units consumed per handler call.
pub static COMPUTE_UNITS_USED: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "perpliq_compute_units_used",
        "Compute units consumed per handler call",
        &["operation"],
        vec![1_000.0, 5_000.0, 10_000.0, 50_000.0, 100_000.0, 500_000.0, 1_000_000.0]
    )
    .unwrap()
});

/// Entry attempts refused because a guarded call was in progress.
pub static GUARD_CONTENTION_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "perpliq_guard_contention_total",
        "Guarded entries refused due to a call already in progress"
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record a successful handler call.
    pub fn handler_succeeded(operation: &str) {
        HANDLER_CALLS_TOTAL
            .with_label_values(&[operation, "success"])
            .inc();
    }

    /// Record an aborted handler call.
    pub fn handler_rejected(operation: &str, reason: &str) {
        HANDLER_CALLS_TOTAL
            .with_label_values(&[operation, "failure"])
            .inc();
        HANDLER_REJECTED_TOTAL
            .with_label_values(&[operation, reason])
            .inc();
    }

    /// Record a strategy invocation.
    pub fn strategy_dispatched(strategy: &str, order_type: &str) {
        STRATEGY_DISPATCH_TOTAL
            .with_label_values(&[strategy, order_type])
            .inc();
    }

    /// Record compute units consumed by one call.
    pub fn compute_used(operation: &str, units: u64) {
        COMPUTE_UNITS_USED
            .with_label_values(&[operation])
            .observe(units as f64);
    }

    /// Record a refused guarded entry.
    pub fn guard_contention() {
        GUARD_CONTENTION_TOTAL.inc();
    }

    /// Render all registered metrics in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
