//! Vulkan ICD manifest patching
//!
//! The Vulkan loader finds a driver through an ICD manifest such as
//!
//! ```json
//! {
//!   "file_format_version": "1.0.0",
//!   "ICD": {
//!     "library_path": "/usr/local/lib/libMoltenVK.dylib",
//!     "api_version": "1.3.0"
//!   }
//! }
//! ```
//!
//! For a self-contained app bundle the absolute `library_path` has to point into the
//! bundle's `Frameworks` directory instead. Key order is preserved when rewriting.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Framework directory relative to `Contents/Resources/vulkan/icd.d`
pub const DEFAULT_FRAMEWORK_PATH: &str = "../../../Frameworks";

/// `api_version` written when a manifest has none
pub const DEFAULT_API_VERSION: &str = "1.3.0";

/// `file_format_version` written when a manifest has none
pub const DEFAULT_FILE_FORMAT_VERSION: &str = "1.0.0";

const DRIVER_KEY: &str = "ICD";
const LIBRARY_PATH_KEY: &str = "library_path";
const API_VERSION_KEY: &str = "api_version";
const FILE_FORMAT_VERSION_KEY: &str = "file_format_version";
const MANIFEST_EXTENSION: &str = "json";

/// Errors that stop the whole run
#[derive(Error, Debug)]
pub enum IcdError {
    /// ICD directory does not exist
    #[error("ICD directory {} does not exist", .0.display())]
    DirectoryMissing(PathBuf),

    /// ICD path exists but is not a directory
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// ICD directory could not be listed
    #[error("Unable to read ICD directory {}: {source}", .path.display())]
    ReadDirFailed {
        /// ICD directory
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Manifests were found but none could be patched
    #[error("No ICD files were successfully modified ({found} found)")]
    NothingPatched {
        /// Number of manifest files found
        found: usize,
    },
}

/// Errors for a single manifest, the batch carries on
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest could not be read
    #[error("read failed: {0}")]
    Read(#[source] io::Error),

    /// Manifest is not valid JSON
    #[error("invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// `ICD` is present but is not an object
    #[error("\"ICD\" entry is not an object")]
    InvalidDriverDescriptor,

    /// `library_path` is present but is not a string
    #[error("\"library_path\" is not a string")]
    InvalidLibraryPath,

    /// Patched manifest could not be serialized
    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Patched manifest could not be written back
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
}

/// Why a manifest was left alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No top level `ICD` object
    NotAnIcdManifest,
    /// `library_path` is missing or has no file name component
    NoLibraryName {
        /// The `library_path` value found, empty when absent
        original: String,
    },
}

/// What happened to one manifest
#[derive(Debug)]
pub enum ManifestOutcome {
    /// `library_path` was rewritten and the file saved
    Patched {
        /// Previous `library_path`
        original: String,
        /// New bundle relative `library_path`
        new: String,
    },
    /// File was not modified
    Skipped(SkipReason),
    /// File could not be processed
    Failed(ManifestError),
}

impl ManifestOutcome {
    /// Whether the file was rewritten
    pub const fn is_patched(&self) -> bool {
        matches!(self, Self::Patched { .. })
    }
}

/// Outcome for one manifest file
#[derive(Debug)]
pub struct ManifestReport {
    /// Manifest file
    pub path: PathBuf,
    /// What happened to it
    pub outcome: ManifestOutcome,
}

/// Result of patching a directory
#[derive(Debug, Default)]
pub struct PatchSummary {
    /// Every manifest found, in path order
    pub manifests: Vec<ManifestReport>,
}

impl PatchSummary {
    /// Number of manifest files found
    pub fn found(&self) -> usize {
        self.manifests.len()
    }

    /// Number of manifest files rewritten
    pub fn modified(&self) -> usize {
        self.manifests
            .iter()
            .filter(|report| report.outcome.is_patched())
            .count()
    }
}

/// Library paths before and after patching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPathChange {
    /// Previous `library_path`
    pub original: String,
    /// New `library_path`
    pub new: String,
}

/// Rewrite every `*.json` manifest directly inside `icd_dir`
///
/// Per-file problems are logged and recorded in the summary. Finding no manifests at all
/// is not an error, finding some and patching none is.
pub fn patch_icd_directory(icd_dir: &Path, framework_path: &str) -> Result<PatchSummary, IcdError> {
    if !icd_dir.exists() {
        return Err(IcdError::DirectoryMissing(icd_dir.to_path_buf()));
    }
    if !icd_dir.is_dir() {
        return Err(IcdError::NotADirectory(icd_dir.to_path_buf()));
    }

    log::info!("Processing ICD files in: {}", icd_dir.display());
    log::info!("Framework path: {}", framework_path);

    let manifests = list_manifests(icd_dir)?;
    if manifests.is_empty() {
        log::warn!("No JSON files found in ICD directory");
        return Ok(PatchSummary::default());
    }

    let summary = PatchSummary {
        manifests: manifests
            .into_iter()
            .map(|path| {
                let outcome = patch_icd_file(&path, framework_path);
                ManifestReport { path, outcome }
            })
            .collect(),
    };

    log::info!(
        "Processed {} ICD files, {} successfully modified",
        summary.found(),
        summary.modified()
    );

    if summary.modified() == 0 {
        return Err(IcdError::NothingPatched {
            found: summary.found(),
        });
    }

    Ok(summary)
}

/// Rewrite a single manifest file in place
pub fn patch_icd_file(path: &Path, framework_path: &str) -> ManifestOutcome {
    let outcome = match try_patch_icd_file(path, framework_path) {
        Ok(Ok(change)) => ManifestOutcome::Patched {
            original: change.original,
            new: change.new,
        },
        Ok(Err(reason)) => ManifestOutcome::Skipped(reason),
        Err(e) => ManifestOutcome::Failed(e),
    };

    match &outcome {
        ManifestOutcome::Patched { original, new } => {
            log::info!("Fixed ICD file: {}", path.display());
            log::info!("  Original path: {}", original);
            log::info!("  New path: {}", new);
        }
        ManifestOutcome::Skipped(SkipReason::NotAnIcdManifest) => {
            log::warn!("{} doesn't appear to be a valid ICD file", path.display());
        }
        ManifestOutcome::Skipped(SkipReason::NoLibraryName { original }) => {
            log::warn!(
                "Could not extract library name from '{}' in {}",
                original,
                path.display()
            );
        }
        ManifestOutcome::Failed(e) => {
            log::error!("Error processing {}: {}", path.display(), e);
        }
    }

    outcome
}

fn try_patch_icd_file(
    path: &Path,
    framework_path: &str,
) -> Result<Result<LibraryPathChange, SkipReason>, ManifestError> {
    let contents = fs::read_to_string(path).map_err(ManifestError::Read)?;
    let mut manifest: Value = serde_json::from_str(&contents).map_err(ManifestError::Parse)?;

    let change = match patch_manifest(&mut manifest, framework_path)? {
        Ok(change) => change,
        Err(reason) => return Ok(Err(reason)),
    };

    let mut output = serde_json::to_string_pretty(&manifest).map_err(ManifestError::Serialize)?;
    output.push('\n');
    fs::write(path, output).map_err(ManifestError::Write)?;

    Ok(Ok(change))
}

/// Patch a parsed manifest in memory
///
/// Sets `ICD.library_path` to `<framework_path>/<library file name>` and fills in
/// `ICD.api_version` and `file_format_version` when they are absent. Existing values of
/// those two fields are kept.
pub fn patch_manifest(
    manifest: &mut Value,
    framework_path: &str,
) -> Result<Result<LibraryPathChange, SkipReason>, ManifestError> {
    let Some(root) = manifest.as_object_mut() else {
        return Ok(Err(SkipReason::NotAnIcdManifest));
    };
    let Some(driver) = root.get_mut(DRIVER_KEY) else {
        return Ok(Err(SkipReason::NotAnIcdManifest));
    };
    let driver = driver
        .as_object_mut()
        .ok_or(ManifestError::InvalidDriverDescriptor)?;

    let original = match driver.get(LIBRARY_PATH_KEY) {
        None => String::new(),
        Some(Value::String(path)) => path.clone(),
        Some(_) => return Err(ManifestError::InvalidLibraryPath),
    };

    let library_name = library_file_name(&original);
    if library_name.is_empty() {
        return Ok(Err(SkipReason::NoLibraryName { original }));
    }

    let new = format!("{framework_path}/{library_name}");
    driver.insert(LIBRARY_PATH_KEY.to_string(), Value::String(new.clone()));
    insert_default(driver, API_VERSION_KEY, DEFAULT_API_VERSION);
    insert_default(root, FILE_FORMAT_VERSION_KEY, DEFAULT_FILE_FORMAT_VERSION);

    Ok(Ok(LibraryPathChange { original, new }))
}

fn insert_default(object: &mut Map<String, Value>, key: &str, value: &str) {
    object
        .entry(key)
        .or_insert_with(|| Value::String(value.to_string()));
}

/// Final component of a library path, accepting either separator
fn library_file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or_default()
}

fn list_manifests(icd_dir: &Path) -> Result<Vec<PathBuf>, IcdError> {
    let read_dir_failed = |source| IcdError::ReadDirFailed {
        path: icd_dir.to_path_buf(),
        source,
    };

    let mut manifests = Vec::new();
    for entry in fs::read_dir(icd_dir).map_err(read_dir_failed)? {
        let entry = entry.map_err(read_dir_failed)?;
        // hidden files are not manifests, matching a shell `*.json` glob
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == MANIFEST_EXTENSION) {
            manifests.push(path);
        }
    }

    manifests.sort();
    Ok(manifests)
}
