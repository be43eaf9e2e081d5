//! Copy the assets directory into the build output directory

use build_scripts::{assets_copy, common};
use std::process::ExitCode;

fn main() -> ExitCode {
    let matches = assets_copy::command().get_matches();
    common::finish(assets_copy::run(&matches))
}
