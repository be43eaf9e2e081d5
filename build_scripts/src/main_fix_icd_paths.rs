//! Fix ICD paths for standalone Vulkan app bundle distribution

use build_scripts::{common, fix_icd_paths};
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = fix_icd_paths::command().get_matches();
    common::finish(fix_icd_paths::run(&matches))
}
