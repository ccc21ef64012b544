//! Log output setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    /// Filter used when `RUST_LOG` is not set.
    pub fn default_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }
}

/// Install the global subscriber. Logs go to stderr so reports on stdout
/// stay clean.
pub fn init(verbosity: Verbosity) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(verbosity.default_filter())),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbosity == Verbosity::Verbose)
                .with_writer(std::io::stderr),
        )
        .init();
}
