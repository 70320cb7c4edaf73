//! Engine log initialisation
//!
//! Engine events go to stderr through `tracing`; stdout carries nothing but
//! the TAP stream. The filter comes from `KILN_LOG` and defaults to `warn`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the `tracing` filter directives
pub const LOG_FILTER_ENV: &str = "KILN_LOG";

/// Install the stderr subscriber; later calls are no-ops
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
