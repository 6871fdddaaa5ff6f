//! Logging setup for the bridge binary
//!
//! The level filter comes from `ONVIF2MQTT_LOG_LEVEL`, then `RUST_LOG`, then
//! the mode's default.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode for different use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LoggingMode {
    /// No output
    Silent,
    /// Compact stderr output
    #[default]
    Development,
    /// Verbose diagnostics with source locations
    Debug,
    /// One JSON object per line, for log collectors
    Json,
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize logging with the specified mode
///
/// Call once, before any supervisor is started.
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let result = match mode {
        LoggingMode::Silent => return Ok(()),
        LoggingMode::Development => Registry::default()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .with(create_env_filter("info"))
            .try_init(),
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .pretty()
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(create_env_filter("debug"))
            .try_init(),
        LoggingMode::Json => Registry::default()
            .with(fmt::layer().json().with_current_span(false))
            .with(create_env_filter("info"))
            .try_init(),
    };

    result.map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Create an environment filter with fallback to default level
fn create_env_filter(default_level: &str) -> EnvFilter {
    filter_directive(
        std::env::var("ONVIF2MQTT_LOG_LEVEL").ok(),
        std::env::var("RUST_LOG").ok(),
        default_level,
    )
    .parse()
    .unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// First of the bridge override, `RUST_LOG`, or the default
fn filter_directive(own: Option<String>, rust_log: Option<String>, default_level: &str) -> String {
    let non_blank = |d: &String| !d.trim().is_empty();
    own.filter(non_blank)
        .or(rust_log.filter(non_blank))
        .unwrap_or_else(|| default_level.to_string())
}
