//! Sideband runner library.
//!
//! Configuration loading, logging setup and the process-backed executor used
//! by the `sideband` binary.

pub mod config;
pub mod error;
pub mod executor;

pub use config::{Overrides, RunnerConfig};
pub use error::{RunnerError, RunnerResult};
pub use executor::ProcessExecutor;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` when
/// `verbose` is true.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
