//! Compile GLSL shaders to SPIR-V binaries
//!
//! Usage:
//!     shader_gen <VULKAN_SDK> <SRC_DIRECTORY> <DST_DIRECTORY>
//!     shader_gen [--vulkan-sdk <DIR>] <SRC_DIRECTORY> <DST_DIRECTORY>
//!
//! Without an SDK root (argument, `--vulkan-sdk` or a non-empty `VULKAN_SDK`) `glslc` is
//! taken from `PATH`.

use crate::common;
use anyhow::{bail, Context, Result};
use build_support::config::ToolsConfig;
use build_support::process::{ProcessRunner, SystemProcessRunner};
use build_support::shaders::{CompilerLocation, ShaderCompiler};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming the Vulkan SDK root
pub const VULKAN_SDK_ENV: &str = "VULKAN_SDK";

/// Fully resolved shader build request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderInvocation {
    /// Where `glslc` comes from
    pub location: CompilerLocation,
    /// Shader source tree
    pub src: PathBuf,
    /// SPIR-V output tree
    pub dst: PathBuf,
    /// Stage extensions to compile
    pub extensions: Vec<String>,
    /// Fail the run when any shader fails
    pub strict: bool,
}

/// Command line of `shader_gen`
pub fn command() -> Command {
    Command::new("shader_gen")
        .about("Compile GLSL shaders to SPIR-V using the Vulkan SDK's glslc executable")
        .arg(
            Arg::new("paths")
                .value_name("PATHS")
                .value_parser(value_parser!(PathBuf))
                .num_args(2..=3)
                .required(true)
                .help("[VULKAN_SDK] SRC_DIRECTORY DST_DIRECTORY"),
        )
        .arg(
            Arg::new("vulkan-sdk")
                .long("vulkan-sdk")
                .value_name("DIR")
                .value_parser(value_parser!(OsString))
                .help("Vulkan SDK root when only two paths are given [env: VULKAN_SDK]"),
        )
        .arg(
            Arg::new("extension")
                .long("extension")
                .value_name("EXT")
                .action(ArgAction::Append)
                .help("Shader stage extension to compile, repeatable (default: vert, frag)"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .action(ArgAction::SetTrue)
                .help("Exit with failure if any shader fails to compile"),
        )
        .arg(common::config_arg())
        .arg(common::log_level_arg())
}

/// Combine the command line, configuration and `VULKAN_SDK` value into one request
///
/// The three-path form always uses its first path as the SDK root. With two paths the
/// root comes from `--vulkan-sdk`, then `env_sdk`; empty values count as unset and leave
/// `glslc` to the search path.
pub fn resolve(
    matches: &ArgMatches,
    config: &ToolsConfig,
    env_sdk: Option<OsString>,
) -> Result<ShaderInvocation> {
    let paths: Vec<&PathBuf> = matches
        .get_many::<PathBuf>("paths")
        .context("Missing source and destination directories")?
        .collect();
    let (sdk, src, dst) = match paths.as_slice() {
        [sdk, src, dst] => (Some(sdk.as_os_str().to_os_string()), *src, *dst),
        [src, dst] => {
            let flag = matches.get_one::<OsString>("vulkan-sdk").cloned();
            let sdk = flag
                .filter(|v| !v.is_empty())
                .or_else(|| env_sdk.filter(|v| !v.is_empty()));
            (sdk, *src, *dst)
        }
        _ => bail!("Expected [VULKAN_SDK] SRC_DIRECTORY DST_DIRECTORY"),
    };

    let location = match sdk {
        Some(root) => CompilerLocation::Sdk(common::absolute(&PathBuf::from(root))?),
        None => CompilerLocation::SearchPath,
    };

    let extensions = match matches.get_many::<String>("extension") {
        Some(values) => values.cloned().collect(),
        None => config.shaders.extensions.clone(),
    };

    Ok(ShaderInvocation {
        location,
        src: common::absolute(src)?,
        dst: common::absolute(dst)?,
        extensions,
        strict: matches.get_flag("strict") || config.shaders.fail_on_error,
    })
}

/// Compile the shaders described by `invocation` with `runner`
pub fn execute<R: ProcessRunner>(invocation: &ShaderInvocation, runner: R) -> Result<()> {
    let mut compiler = ShaderCompiler::new(invocation.location.clone(), runner)?
        .with_extensions(invocation.extensions.iter().cloned());
    log::debug!("Using compiler {}", compiler.compiler_path().display());

    let summary = compiler.compile_all(&invocation.src, &invocation.dst)?;
    if !summary.is_success() {
        let failed = summary.failed.len();
        if invocation.strict {
            bail!("{} of {} shader(s) failed to compile", failed, summary.total());
        }
        log::warn!("{} of {} shader(s) failed to compile", failed, summary.total());
    }

    Ok(())
}

/// Compile shaders with the system `glslc`
pub fn run(matches: &ArgMatches) -> Result<()> {
    let config = common::setup(matches)?;
    let invocation = resolve(matches, &config, std::env::var_os(VULKAN_SDK_ENV))?;
    execute(&invocation, SystemProcessRunner)
}
