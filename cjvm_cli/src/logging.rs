use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Builds the filter from `COBALT_LOG` if set, falling back to `info`, then `debug`
/// when `--verbose` was passed. Mirrors the teacher's env-gated `tracing_subscriber`
/// setup, renamed for this project.
pub fn initialize(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("COBALT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}
