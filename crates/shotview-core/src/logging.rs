//! Tracing subscriber setup.
//!
//! Filter priority, highest first:
//!
//! 1. `SHOTVIEW_LOG` (per-target directives, e.g. `shotview_core=debug,warn`)
//! 2. `RUST_LOG`
//! 3. `[logging] level` from the config file
//!
//! Output goes to stderr, either human-readable or one JSON object per line.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::Error;

/// Project-specific filter variable.
pub const LOG_ENV: &str = "SHOTVIEW_LOG";

const FALLBACK_LEVEL: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init(config: &LoggingConfig) -> crate::Result<()> {
    let filter = build_env_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .try_init(),
    };
    result.map_err(|e| Error::Logging(e.to_string()))
}

/// Build the filter from the environment and `config`.
#[must_use]
pub fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    let shotview_log = std::env::var(LOG_ENV).ok();
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(&[shotview_log.as_deref(), rust_log.as_deref(), Some(&config.level)])
}

/// First candidate that parses as a filter wins. Unparseable values fall
/// through to the next one.
fn filter_from(candidates: &[Option<&str>]) -> EnvFilter {
    candidates
        .iter()
        .flatten()
        .filter(|directives| !directives.trim().is_empty())
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_LEVEL))
}
