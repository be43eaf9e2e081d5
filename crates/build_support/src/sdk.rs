//! Vulkan SDK tool lookup
//!
//! The SDK keeps its executables under `Bin` with an `.exe` suffix on Windows and under
//! `bin` everywhere else.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// SDK lookup errors
#[derive(Error, Debug)]
pub enum SdkError {
    /// No SDK root was given
    #[error("Vulkan SDK path must be provided")]
    EmptyRoot,
}

/// Executables shipped with the Vulkan SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkTool {
    /// GLSL to SPIR-V compiler
    Glslc,
    /// HLSL compiler
    Dxc,
    /// SPIR-V disassembler and cross compiler
    SpirvCross,
}

impl SdkTool {
    /// Executable name without platform suffix
    pub const fn name(self) -> &'static str {
        match self {
            Self::Glslc => "glslc",
            Self::Dxc => "dxc",
            Self::SpirvCross => "spirv-cross",
        }
    }
}

const fn bin_directory_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "Bin"
    } else {
        "bin"
    }
}

const fn executable_suffix() -> &'static str {
    if cfg!(target_os = "windows") {
        ".exe"
    } else {
        ""
    }
}

/// Path of `tool` inside the SDK at `sdk_root`
///
/// Only builds the path, the caller checks that it exists.
pub fn resolve_tool(sdk_root: &Path, tool: SdkTool) -> Result<PathBuf, SdkError> {
    if sdk_root.as_os_str().is_empty() {
        return Err(SdkError::EmptyRoot);
    }

    Ok(sdk_root
        .join(bin_directory_name())
        .join(format!("{}{}", tool.name(), executable_suffix())))
}

/// Path of `glslc` inside the SDK
pub fn glslc_path(sdk_root: &Path) -> Result<PathBuf, SdkError> {
    resolve_tool(sdk_root, SdkTool::Glslc)
}
