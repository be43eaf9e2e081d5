//! Fix ICD paths for standalone Vulkan app bundle distribution
//!
//! Rewrites the ICD manifests shipped inside the bundle so the Vulkan loader picks up the
//! driver library copied into the bundle's Frameworks directory.

use crate::common;
use anyhow::{Context, Result};
use build_support::config::ToolsConfig;
use build_support::icd::patch_icd_directory;
use clap::{value_parser, Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Resolved patch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcdInvocation {
    /// Directory holding the manifests
    pub icd_dir: PathBuf,
    /// Framework directory written into each `library_path`
    pub framework_path: String,
}

/// Command line of `fix_icd_paths`
pub fn command() -> Command {
    Command::new("fix_icd_paths")
        .about("Fix ICD paths for app bundle distribution")
        .arg(
            Arg::new("icd_dir")
                .long("icd_dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .help("Directory containing ICD files"),
        )
        .arg(
            Arg::new("framework_path")
                .long("framework_path")
                .value_name("PATH")
                .help("Path to frameworks directory (default: ../../../Frameworks)"),
        )
        .arg(common::config_arg())
        .arg(common::log_level_arg())
}

/// Take the framework path from the command line, else from the configuration
pub fn resolve(matches: &ArgMatches, config: &ToolsConfig) -> Result<IcdInvocation> {
    let icd_dir = matches
        .get_one::<PathBuf>("icd_dir")
        .context("Missing ICD directory")?;
    let framework_path = matches
        .get_one::<String>("framework_path")
        .unwrap_or(&config.icd.framework_path);

    Ok(IcdInvocation {
        icd_dir: common::absolute(icd_dir)?,
        framework_path: framework_path.clone(),
    })
}

/// Patch every manifest in the ICD directory
pub fn run(matches: &ArgMatches) -> Result<()> {
    let config = common::setup(matches)?;
    let invocation = resolve(matches, &config)?;
    patch_icd_directory(&invocation.icd_dir, &invocation.framework_path)?;
    Ok(())
}
