//! Keeper error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeeperError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid value: {0}")]
    Core(#[from] perpliq_core::CoreError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] perpliq_telemetry::TelemetryError),

    #[error("Job {job} failed to run: {reason}")]
    Job { job: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for KeeperError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

pub type KeeperResult<T> = Result<T, KeeperError>;
