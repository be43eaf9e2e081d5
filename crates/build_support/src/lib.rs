//! # Build Support
//!
//! Build-time helpers for the graphics example project.
//!
//! ## Tools
//!
//! - **Directory Mirror**: Replace a build output directory with a fresh copy of the assets
//! - **Shader Batch Compiler**: Compile every `.vert`/`.frag` source to SPIR-V with `glslc`
//! - **ICD Manifest Patcher**: Point Vulkan ICD manifests at the driver bundled with the app
//!
//! Each tool is a plain function (or a small struct around one) that validates its inputs,
//! performs the work and hands back a summary. Exit codes and console formatting stay in
//! the `build_scripts` binaries.
//!
//! ```rust,no_run
//! use build_support::shaders::{CompilerLocation, ShaderCompiler};
//! use build_support::process::SystemProcessRunner;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let location = CompilerLocation::Sdk("/opt/vulkan-sdk".into());
//!     let mut compiler = ShaderCompiler::new(location, SystemProcessRunner)?;
//!     let summary = compiler.compile_all("shaders".as_ref(), "target/shaders".as_ref())?;
//!     println!("{} compiled, {} failed", summary.compiled.len(), summary.failed.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod icd;
pub mod logging;
pub mod mirror;
pub mod process;
pub mod sdk;
pub mod shaders;

pub use config::{Config, ConfigError, ToolsConfig};
pub use icd::{patch_icd_directory, IcdError, ManifestOutcome, PatchSummary};
pub use mirror::{mirror_directory, MirrorError, MirrorOutcome};
pub use shaders::{CompileSummary, CompilerLocation, ShaderCompiler, ShaderError};

/// Common imports for the command line tools
pub mod prelude {
    pub use crate::{
        config::{Config, ToolsConfig},
        icd::{patch_icd_directory, PatchSummary, DEFAULT_FRAMEWORK_PATH},
        logging,
        mirror::mirror_directory,
        process::SystemProcessRunner,
        sdk::SdkTool,
        shaders::{CompileSummary, CompilerLocation, ShaderCompiler},
    };
}
