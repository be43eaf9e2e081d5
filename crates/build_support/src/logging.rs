//! Logging setup shared by the command line tools

pub use log::{debug, error, info, trace, warn, LevelFilter};

/// Initialize the logging system
///
/// `default_level` applies when `RUST_LOG` is unset. Calling this more than once is harmless,
/// later calls keep the logger installed by the first one.
pub fn init(default_level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .format_target(false)
        .try_init();
}

/// Parse a level name such as `"info"` or `"debug"`, falling back to `Info`
pub fn level_from_str(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}
