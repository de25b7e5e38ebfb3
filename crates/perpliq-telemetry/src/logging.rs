//! Structured logging initialization.
//!
//! Filter directives come from `PERPLIQ_LOG`, then `RUST_LOG`, then
//! [`DEFAULT_FILTER`]. Handler and venue spans are noisy at `debug`, so the
//! default keeps them there and everything else at `info`.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str =
    "info,perpliq_handler=debug,perpliq_venue=debug,perpliq_keeper=info,perpliq_telemetry=warn";

/// Crate-specific filter variable, checked before `RUST_LOG`.
pub const FILTER_ENV: &str = "PERPLIQ_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, with the active span list.
    Json,
    Pretty,
}

impl LogFormat {
    /// `RUST_ENV=production` selects JSON.
    #[must_use]
    pub fn from_rust_env(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub format: LogFormat,
    pub filter: String,
}

impl LogSettings {
    /// Resolve settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var(FILTER_ENV).ok(),
            std::env::var("RUST_LOG").ok(),
            std::env::var("RUST_ENV").ok().as_deref(),
        )
    }

    fn resolve(
        crate_filter: Option<String>,
        rust_log: Option<String>,
        rust_env: Option<&str>,
    ) -> Self {
        let filter = crate_filter
            .into_iter()
            .chain(rust_log)
            .find(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        Self {
            format: LogFormat::from_rust_env(rust_env),
            filter,
        }
    }

    /// Parse the filter directives.
    ///
    /// # Errors
    /// `LoggingInit` naming the offending directive string.
    pub fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        EnvFilter::try_new(&self.filter)
            .map_err(|e| TelemetryError::LoggingInit(format!("filter {:?}: {e}", self.filter)))
    }
}

/// Initialize structured logging from the environment.
pub fn init_logging() -> TelemetryResult<()> {
    init_logging_with(&LogSettings::from_env())
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging_with(settings: &LogSettings) -> TelemetryResult<()> {
    let env_filter = settings.env_filter()?;

    let result = match settings.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(true).with_thread_names(true))
            .try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let settings = LogSettings::resolve(None, None, None);
        assert_eq!(settings.filter, DEFAULT_FILTER);
        assert_eq!(settings.format, LogFormat::Pretty);
        assert!(settings.env_filter().is_ok());
    }

    #[test]
    fn test_crate_filter_wins_over_rust_log() {
        let settings = LogSettings::resolve(
            Some("perpliq_handler=trace".to_string()),
            Some("warn".to_string()),
            Some("production"),
        );
        assert_eq!(settings.filter, "perpliq_handler=trace");
        assert_eq!(settings.format, LogFormat::Json);

        let blank = LogSettings::resolve(Some("  ".to_string()), Some("warn".to_string()), None);
        assert_eq!(blank.filter, "warn");
    }

    #[test]
    fn test_bad_directive_is_reported() {
        let settings = LogSettings {
            format: LogFormat::Pretty,
            filter: "perpliq_handler=loud".to_string(),
        };
        match settings.env_filter() {
            Err(TelemetryError::LoggingInit(msg)) => assert!(msg.contains("perpliq_handler=loud")),
            other => panic!("expected LoggingInit, got {other:?}"),
        }
    }

    #[test]
    fn test_second_init_fails() {
        let settings = LogSettings::resolve(None, None, None);
        let _ = init_logging_with(&settings);
        assert!(matches!(
            init_logging_with(&settings),
            Err(TelemetryError::LoggingInit(_))
        ));
    }
}
