//! Logging setup for the zqlz-bench binary
//!
//! Diagnostics go to stderr so that stdout carries only the command output.
//! `RUST_LOG` takes precedence over the built-in filters.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,zqlz_bench=info";
const VERBOSE_FILTER: &str = "debug,zqlz_bench=debug,zqlz_driver_sqlite=debug";

/// Install the global subscriber
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let default_filter = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console_layer = fmt::layer()
        .with_target(verbose)
        .with_file(verbose)
        .with_line_number(verbose)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init()?;

    Ok(())
}
