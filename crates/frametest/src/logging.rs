//! Tracing subscriber setup.
//!
//! The engine only emits `tracing` events; installing a subscriber is up to
//! the embedding application. [`init_tracing`] is the one the CLI uses.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Variable that overrides the filter directives
pub const LOG_ENV: &str = "FRAMETEST_LOG";

/// Filter for `level`, unless [`LOG_ENV`] holds valid directives
#[must_use]
pub fn filter_for(level: Level) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install a global subscriber writing to stderr, as text or as JSON lines.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(level: Level, json: bool) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}
