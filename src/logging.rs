//! Diagnostic logging via `tracing`.
//!
//! Human-facing progress goes to stdout through [`crate::output`]; this
//! module only routes `tracing` events to stderr.
//!
//! | Flags | Level |
//! |-------|-------|
//! | `-q` | error |
//! | (none) | warn |
//! | `-v` | info |
//! | `-vv` | debug |
//! | `-vvv` | trace |
//!
//! `RUST_LOG` overrides the flags entirely.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Map `-v` count minus `-q` count to a level.
pub fn level_for(verbosity: i8) -> Level {
    match verbosity {
        i8::MIN..=-1 => Level::ERROR,
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Build an `EnvFilter`, respecting the `RUST_LOG` env var.
///
/// Dependencies (reqwest, hyper, ...) stay at warn unless `RUST_LOG` says
/// otherwise.
fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level.as_str().to_lowercase();
        let deps = if level == "error" { "error" } else { "warn" };
        EnvFilter::new(format!("{deps},folio={level}"))
    })
}

/// Install the stderr subscriber. A second call is a no-op.
pub fn init(verbosity: i8) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    // Fails only if a subscriber is already set (e.g. in tests).
    let _ = tracing_subscriber::registry()
        .with(build_env_filter(level_for(verbosity)))
        .with(layer)
        .try_init();
}
