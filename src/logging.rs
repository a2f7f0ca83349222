//! Logging initialization and configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when no level is configured.
pub const DEFAULT_FILTER: &str = "breathwork=info";

/// Initialize logging from a configured level such as `debug` or a full
/// directive string like `breathwork=debug,tower_http=info`.
///
/// A bare level applies to this crate only. Unparseable input falls back to
/// [`DEFAULT_FILTER`]. Returns `Err` if a subscriber is already installed.
pub fn init_with_filter(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(build_filter(level))
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}

fn build_filter(level: &str) -> EnvFilter {
    let level = level.trim();
    let directive = match level {
        "error" | "warn" | "info" | "debug" | "trace" => format!("breathwork={}", level),
        "" => DEFAULT_FILTER.to_string(),
        other => other.to_string(),
    };
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
