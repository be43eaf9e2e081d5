//! Compile GLSL shaders to SPIR-V binaries

use build_scripts::{common, shader_gen};
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = shader_gen::command().get_matches();
    common::finish(shader_gen::run(&matches))
}
