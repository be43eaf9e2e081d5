//! Argument and startup handling shared by the build script binaries

use anyhow::{Context, Result};
use build_support::config::{Config, ToolsConfig};
use build_support::logging::{self, LevelFilter};
use clap::{value_parser, Arg, ArgMatches};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Names accepted by `--log-level`
pub const LOG_LEVELS: [&str; 6] = ["error", "warn", "info", "debug", "trace", "off"];

/// `--config <FILE>`
pub fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("TOML or RON configuration file")
}

/// `--log-level <LEVEL>`
pub fn log_level_arg() -> Arg {
    Arg::new("log-level")
        .long("log-level")
        .value_name("LEVEL")
        .value_parser(LOG_LEVELS)
        .help("Log level when RUST_LOG is unset")
}

/// Load the configuration file, if any, and start logging
///
/// Logging is initialized even when the configuration fails to load so the error can be
/// reported.
pub fn setup(matches: &ArgMatches) -> Result<ToolsConfig> {
    let loaded = match matches.get_one::<PathBuf>("config") {
        Some(path) => ToolsConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration '{}'", path.display())),
        None => Ok(ToolsConfig::default()),
    };

    let level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .or_else(|| loaded.as_ref().ok().map(|config| config.log_level.as_str()))
        .map_or(LevelFilter::Info, logging::level_from_str);
    logging::init(level);

    loaded
}

/// Make `path` absolute against the current directory
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}

/// Process exit status for a tool run, logging the error on failure
///
/// 0 on success, 1 on any error.
pub fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            log::error!("Error: {:#}", e);
            1
        }
    }
}

/// Report the result of a tool run and turn it into the process exit code
pub fn finish(result: Result<()>) -> ExitCode {
    ExitCode::from(exit_status(&result))
}
