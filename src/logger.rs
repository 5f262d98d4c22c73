//! Tracing setup.
//!
//! `init` installs the global fmt subscriber with an env-filter built from
//! the configured level string. `RUST_LOG` still wins when set, so operators
//! can raise per-module verbosity without touching the config file.

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

pub fn init(level: &str) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| AppError::Logger(format!("invalid log level '{level}': {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| AppError::Logger(format!("subscriber init failed: {e}")))
}
