//! Diagnostics on standard error
//!
//! Stdout carries exactly one envelope, so every tracing event goes to
//! stderr. `CANOPY_LOG` takes an `EnvFilter` directive; without it the
//! configured verbosity picks the level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Verbosity;

pub const LOG_ENV: &str = "CANOPY_LOG";

/// Default filter directive for a verbosity
pub fn default_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::Quiet => "error",
        Verbosity::Normal => "warn",
        Verbosity::Verbose => "info",
        Verbosity::Debug => "debug",
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(verbosity == Verbosity::Debug),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_directive(Verbosity::Quiet), "error");
        assert_eq!(default_directive(Verbosity::Normal), "warn");
        assert_eq!(default_directive(Verbosity::Verbose), "info");
        assert_eq!(default_directive(Verbosity::Debug), "debug");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(Verbosity::Quiet);
        init(Verbosity::Debug);
    }
}
