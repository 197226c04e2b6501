//! Tracing subscriber setup.
//!
//! The library itself only emits `tracing` events; applications that want
//! them on stderr call [`init`] once at startup.

use crate::config::LoggingConfig;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to the
/// configured level. Returns `false` if a global subscriber was already set.
pub fn init(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if installed {
        debug!(
            "logging initialized (level: {}, log_commands: {})",
            config.level, config.log_commands
        );
    }
    installed
}
