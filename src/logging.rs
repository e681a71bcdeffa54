//! Logger setup for the binary and the headless tests.

use std::sync::Once;

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Installs the global `env_logger` once. Later calls do nothing.
///
/// The filter comes from `config.filter`, then `RUST_LOG`, then defaults to `info`.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        // A test harness may already own the logger.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}
