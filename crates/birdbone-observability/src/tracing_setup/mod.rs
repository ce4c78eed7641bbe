//! Tracing setup: subscriber initialization, span macros, event helpers.

pub mod events;
pub mod spans;

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use birdbone_core::config::ObservabilityConfig;

static INIT: Once = Once::new();

/// Environment variable holding a full `EnvFilter` directive string.
pub const LOG_ENV: &str = "BIRDBONE_LOG";

/// Initialize the global subscriber.
///
/// `BIRDBONE_LOG` wins when set and parseable (e.g.
/// `BIRDBONE_LOG=birdbone_healing=debug,info`). Otherwise the configured
/// level is used, falling back to `info`. Idempotent; a subscriber
/// installed elsewhere is left in place.
pub fn init_tracing(config: &ObservabilityConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let registry = tracing_subscriber::registry().with(filter);
        let _ = if config.json_logs {
            registry
                .with(fmt::layer().with_target(true).with_thread_ids(true).json())
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init()
        };
    });
}
