//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the log filter, e.g.
/// `SALESDASH_LOG=salesdash_core=debug,tower_http=debug`.
pub const LOG_ENV: &str = "SALESDASH_LOG";

pub const DEFAULT_FILTER: &str = "salesdash=info";

/// Install the global subscriber. Idempotent.
///
/// Logs go to stderr so `report --format json` output stays machine-readable.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let installed = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .try_init();
        if let Err(error) = installed {
            eprintln!("warning: logging disabled: {error}");
        }
    });
}
