//! Diagnostic logging setup
//!
//! Logs go to stderr only; stdout is reserved for response output.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogFormat;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "VOLLEY_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Build the log filter: `--debug` forces debug, otherwise `VOLLEY_LOG`,
/// then `RUST_LOG`, then warnings only.
pub fn build_filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(debug: bool, format: LogFormat) {
    let filter = build_filter(debug);
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(debug))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
