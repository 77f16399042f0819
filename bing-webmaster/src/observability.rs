//! Log subscriber setup for binaries built on this crate.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is left to the application.

use tracing_subscriber::EnvFilter;

use crate::errors::{Result, WebmasterError};

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "info,bing_webmaster=debug,bing_webmaster_cli=debug"
    } else {
        "warn"
    }
}

/// Builds the event filter, preferring `RUST_LOG` when it is set.
#[must_use]
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

/// Installs a global subscriber writing to stderr.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(verbose: bool, format: LogFormat) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(verbose)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| WebmasterError::Config(format!("failed to install log subscriber: {e}")))
}
