//! Prometheus metrics and structured logging for perpliq.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus metrics for handler outcomes, rejections, strategy dispatch
//!   and compute usage

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, init_logging_with, LogFormat, LogSettings};
pub use metrics::Metrics;
