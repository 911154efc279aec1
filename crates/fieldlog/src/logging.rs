//! Diagnostic logging.
//!
//! Command results go to stdout, so diagnostics are written to stderr and
//! stay at warnings unless `-v` or `RUST_LOG` asks for more. Storage
//! operations log at debug; skipped records and unreadable drafts log at
//! warn.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much diagnostic output to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only (`-q`).
    Quiet,
    /// Warnings, e.g. records skipped while loading.
    #[default]
    Normal,
    /// Every storage read and write (`-v`).
    Verbose,
    /// Everything (`-vv`).
    Trace,
}

impl Verbosity {
    /// Map the `-v` count and `-q` flag to a verbosity. `-q` wins.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Most detailed level that is shown.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive limiting output to this crate at [`Verbosity::level`].
    #[must_use]
    pub fn directive(self) -> String {
        format!("fieldlog={}", self.level().to_string().to_ascii_lowercase())
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG`, when set and valid, replaces the filter built from
/// `verbosity`. Calling this again is harmless.
///
/// ```no_run
/// use fieldlog::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(1, false));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

/// Route warnings to the test harness output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("fieldlog=warn")
        .with_test_writer()
        .try_init();
}
