//! Development-time tracing.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: diagnostics via `RUST_LOG` or `--debug`,
//!   written to stderr. Not part of command output.
//!
//! - **Product output**: markdown, summaries and `--verbose` progress lines
//!   are printed directly by the commands and are unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the filter is `warn`, or
/// `warn,usereq=debug` with `--debug`.
///
/// # Example
/// ```bash
/// RUST_LOG=usereq=trace req --here --references
/// ```
pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if debug { "warn,usereq=debug" } else { "warn" })
    });

    // A second init (e.g. in-process tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
