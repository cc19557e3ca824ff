//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt};

use crate::config::logging::LoggingConfig;

/// Initialize the global tracing subscriber from configuration.
///
/// Call once at process startup; a second call panics inside
/// `tracing_subscriber`. JSON output is the default so log lines stay
/// machine-parseable; set `format = "pretty"` for local work.
pub fn init_logging(config: &LoggingConfig) {
    let filter = level_filter(config);
    match config.format.as_str() {
        "pretty" => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
    }
}

/// The effective log filter: `RUST_LOG` when set, the configured level
/// otherwise.
fn level_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}
