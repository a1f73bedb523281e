//! Tracing subscriber setup.
//!
//! `RUST_LOG` takes precedence over the default level so operators can turn
//! individual invocations up to `debug` without touching anything else.

use tracing_subscriber::EnvFilter;

use crate::error::LaunchError;

pub fn init(default_level: &str) -> Result<(), LaunchError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| LaunchError::Logger(e.to_string()))
}
