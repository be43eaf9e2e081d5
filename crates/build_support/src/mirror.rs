//! Directory mirroring
//!
//! Replaces a destination directory with a recursive copy of a source directory.
//! Used to copy the `assets` folder next to the built executable.

use fs_extra::dir::CopyOptions;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory mirroring errors
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Source is missing or not a directory
    #[error("Source directory '{}' does not exist", .0.display())]
    SourceMissing(PathBuf),

    /// Existing destination could not be removed
    #[error("Unable to delete '{}': {source}", .path.display())]
    RemoveFailed {
        /// Destination path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Parent of the destination could not be created
    #[error("Unable to create '{}': {source}", .path.display())]
    CreateParentFailed {
        /// Parent directory path
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Recursive copy failed part way, the destination may be partially populated
    #[error("Failed to copy '{}' to '{}': {source}", .src.display(), .dst.display())]
    CopyFailed {
        /// Source directory
        src: PathBuf,
        /// Destination directory
        dst: PathBuf,
        /// Underlying cause
        #[source]
        source: fs_extra::error::Error,
    },
}

/// What a successful mirror did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorOutcome {
    /// Whether something already existed at the destination and was deleted first
    pub replaced_existing: bool,
    /// Number of bytes copied
    pub bytes_copied: u64,
}

/// Make `dst` an exact recursive copy of `src`
///
/// Anything already at `dst` (file, symlink or directory) is deleted first. A failure
/// during the copy is not rolled back.
pub fn mirror_directory(src: &Path, dst: &Path) -> Result<MirrorOutcome, MirrorError> {
    if !src.is_dir() {
        return Err(MirrorError::SourceMissing(src.to_path_buf()));
    }

    let replaced_existing = remove_path(dst).map_err(|source| MirrorError::RemoveFailed {
        path: dst.to_path_buf(),
        source,
    })?;
    if replaced_existing {
        log::warn!(
            "Target directory '{}' already exists. Removed it first",
            dst.display()
        );
    }

    if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| MirrorError::CreateParentFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut options = CopyOptions::new();
    options.content_only = true;
    options.copy_inside = true;

    let bytes_copied =
        fs_extra::dir::copy(src, dst, &options).map_err(|source| MirrorError::CopyFailed {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source,
        })?;

    log::info!("Successfully copied '{}' to '{}'", src.display(), dst.display());

    Ok(MirrorOutcome {
        replaced_existing,
        bytes_copied,
    })
}

/// Delete whatever is at `path`, returning whether anything was there
pub(crate) fn remove_path(path: &Path) -> io::Result<bool> {
    // symlink_metadata so a link to a directory is unlinked rather than followed
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }

    Ok(true)
}
