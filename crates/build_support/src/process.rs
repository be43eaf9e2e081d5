//! External process execution
//!
//! The shader compiler talks to `glslc` through [`ProcessRunner`] so tests can swap in a
//! fake without spawning anything.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Command;

/// Result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    /// Captured standard error
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the process exited with status 0
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Runs a program to completion
pub trait ProcessRunner {
    /// Spawn `program` with `args` and block until it exits
    ///
    /// An `Err` means the process could not be started at all. A process that ran and
    /// failed is reported through [`ProcessOutput::code`].
    fn run(&mut self, program: &Path, args: &[OsString]) -> io::Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&mut self, program: &Path, args: &[OsString]) -> io::Result<ProcessOutput> {
        let output = Command::new(program).args(args).output()?;

        // glslc prints diagnostics on stderr, stdout is only echoed at debug level
        if !output.stdout.is_empty() {
            log::debug!("{}", String::from_utf8_lossy(&output.stdout).trim_end());
        }

        Ok(ProcessOutput {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
