//! Installs the process-wide tracing subscriber.
//!
//! Both the coordinator and every self-re-exec worker call [`init`] as the
//! first thing in `main`, so worker-process logs interleave with the
//! coordinator's on whatever terminal or file collects stderr.

use tracing_subscriber::EnvFilter;

/// Installs a compact, stderr-writing subscriber filtered by `RUST_LOG`
/// (defaulting to `info` when unset).
///
/// Safe to call once per process; calling it a second time in the same
/// process is a logic error the `tracing` crate itself will report.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}
