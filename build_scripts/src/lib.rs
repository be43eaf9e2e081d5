//! Command line front ends for `build_support`
//!
//! Each tool module builds its clap [`Command`](clap::Command), turns the parsed matches
//! into a plain invocation struct and runs it. The `main_*.rs` binaries only glue these
//! together and map the result to an exit code.

pub mod assets_copy;
pub mod common;
pub mod fix_icd_paths;
pub mod shader_gen;
