//! Tracing subscriber setup for the binary
//!
//! `RUST_LOG` wins when set; otherwise the level follows CLI verbosity.
//! Output goes to stderr so replies on stdout stay clean.

use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Default filter directive for a verbosity level
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "sentiflow=info,warn",
        Verbosity::VeryVerbose => "sentiflow=debug,info",
    }
}

/// Install the global subscriber; a second call is a no-op
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(matches!(verbosity, Verbosity::VeryVerbose))
        .with_writer(std::io::stderr)
        .try_init();
}
