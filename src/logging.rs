//! Logger configuration.

use env_logger::Builder;
use log::LevelFilter;

/// Initializes the logger with the given default level.
///
/// `RUST_LOG` still takes precedence, so debug output from the subprocess
/// plumbing can be enabled without rebuilding.
pub fn initialize_logger(level: LevelFilter) {
    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
