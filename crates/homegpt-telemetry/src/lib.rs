//! Logging for homegpt
//!
//! Installs a `tracing-subscriber` registry with an env filter and a
//! human-readable or JSON formatter.

use homegpt_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Pick the filter directive, letting `RUST_LOG` win over configuration
fn filter_directive(config: &TelemetryConfig, rust_log: Option<String>) -> String {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.log_filter.clone())
}

/// Initialize the global subscriber from configuration
///
/// An invalid filter directive falls back to `info` with a warning.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    let directive = filter_directive(config, std::env::var("RUST_LOG").ok());

    let (filter, rejected) = match EnvFilter::try_new(&directive) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new("info"), Some(e)),
    };

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    if let Some(e) = rejected {
        tracing::warn!(directive = %directive, error = %e, "invalid log filter, using 'info'");
    }

    Ok(())
}
