//! Copy the assets directory into the build output directory
//!
//! Usage:
//!     assets_copy <SRC_DIRECTORY> <DST_DIRECTORY>
//!     assets_copy --src_directory <SRC_DIRECTORY> --dst_directory <DST_DIRECTORY>

use crate::common;
use anyhow::{Context, Result};
use build_support::mirror::mirror_directory;
use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Absolute source and destination of a copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyPaths {
    /// Directory copied from
    pub src: PathBuf,
    /// Directory replaced by the copy
    pub dst: PathBuf,
}

/// Command line of `assets_copy`
pub fn command() -> Command {
    Command::new("assets_copy")
        .about("Copy assets directory to build output directory")
        .arg(
            Arg::new("src")
                .value_name("SRC_DIRECTORY")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("src_directory")
                .conflicts_with("src_directory")
                .help("Source directory to copy from"),
        )
        .arg(
            Arg::new("dst")
                .value_name("DST_DIRECTORY")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("dst_directory")
                .conflicts_with("dst_directory")
                .help("Destination directory to copy to"),
        )
        .arg(
            Arg::new("src_directory")
                .long("src_directory")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Source directory to copy from"),
        )
        .arg(
            Arg::new("dst_directory")
                .long("dst_directory")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Destination directory to copy to"),
        )
        .arg(common::config_arg())
        .arg(common::log_level_arg())
}

/// Pick the source and destination from the positional or named form
pub fn resolve_paths(matches: &ArgMatches) -> Result<CopyPaths> {
    let src = matches
        .get_one::<PathBuf>("src_directory")
        .or_else(|| matches.get_one::<PathBuf>("src"))
        .context("Missing source directory")?;
    let dst = matches
        .get_one::<PathBuf>("dst_directory")
        .or_else(|| matches.get_one::<PathBuf>("dst"))
        .context("Missing destination directory")?;

    Ok(CopyPaths {
        src: common::absolute(src)?,
        dst: common::absolute(dst)?,
    })
}

/// Mirror the source directory onto the destination
pub fn run(matches: &ArgMatches) -> Result<()> {
    common::setup(matches)?;
    let paths = resolve_paths(matches)?;

    log::info!("Copy: {} -> {}", paths.src.display(), paths.dst.display());
    mirror_directory(&paths.src, &paths.dst)?;

    Ok(())
}
