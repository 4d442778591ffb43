//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "syllabi_sync=info";
const VERBOSE_LOG_FILTER: &str = "syllabi_sync=debug";

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects the debug
/// filter. Calling this more than once is harmless.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_LOG_FILTER } else { DEFAULT_LOG_FILTER })
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
