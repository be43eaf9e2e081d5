//! GLSL to SPIR-V batch compilation
//!
//! Walks a shader source tree and runs `glslc` once per stage source, writing
//! `<name>.<ext>.spv` into the same relative location under the output tree.
//! The output tree is deleted and rebuilt on every run.

use crate::mirror::remove_path;
use crate::process::ProcessRunner;
use crate::sdk::{self, SdkError};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions compiled when no others are configured
pub const DEFAULT_STAGE_EXTENSIONS: &[&str] = &["vert", "frag"];

/// Extension appended to every compiled output
pub const SPIRV_EXTENSION: &str = "spv";

const GLSLC: &str = "glslc";

/// Shader compilation errors
///
/// All of these abort the batch. A single shader failing to compile is recorded in
/// [`CompileSummary::failed`] instead.
#[derive(Error, Debug)]
pub enum ShaderError {
    /// SDK root is missing or not a directory
    #[error("Vulkan SDK directory '{}' does not exist", .0.display())]
    SdkMissing(PathBuf),

    /// SDK root was unusable
    #[error(transparent)]
    Sdk(#[from] SdkError),

    /// `glslc` is not at its expected location inside the SDK
    #[error("glslc not found at {}", .0.display())]
    CompilerMissing(PathBuf),

    /// Source tree is missing or not a directory
    #[error("Source directory '{}' does not exist", .0.display())]
    SourceMissing(PathBuf),

    /// Old output tree could not be removed
    #[error("Unable to clear destination directory '{}': {source}", .path.display())]
    ClearFailed {
        /// Output directory
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// Output directory could not be created
    #[error("Unable to create destination directory '{}': {source}", .path.display())]
    CreateDirFailed {
        /// Directory being created
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// The compiler executable vanished or is not on `PATH`
    #[error("{} not found. Make sure the Vulkan SDK is installed correctly", .program.display())]
    CompilerNotFound {
        /// Program that was spawned
        program: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// The compiler could not be started for another reason
    #[error("Failed to run {}: {source}", .program.display())]
    SpawnFailed {
        /// Program that was spawned
        program: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },
}

/// Where to find `glslc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerLocation {
    /// `<root>/bin/glslc`, or `<root>\Bin\glslc.exe` on Windows
    Sdk(PathBuf),
    /// Plain `glslc`, looked up on `PATH` when spawned
    SearchPath,
}

/// One shader source and where its SPIR-V goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderJob {
    /// Source file
    pub source: PathBuf,
    /// Directory of the source relative to the source root, empty at the root
    pub relative_dir: PathBuf,
    /// Compiled output file
    pub output: PathBuf,
}

/// A shader the compiler rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileFailure {
    /// The shader that failed
    pub job: ShaderJob,
    /// Compiler exit code, `None` if it was killed
    pub code: Option<i32>,
    /// Compiler diagnostics
    pub stderr: String,
}

/// Result of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileSummary {
    /// Shaders compiled successfully
    pub compiled: Vec<ShaderJob>,
    /// Shaders the compiler rejected
    pub failed: Vec<CompileFailure>,
}

impl CompileSummary {
    /// True when no shader failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of shader sources found
    pub fn total(&self) -> usize {
        self.compiled.len() + self.failed.len()
    }
}

/// Batch shader compiler
pub struct ShaderCompiler<R: ProcessRunner> {
    compiler: PathBuf,
    extensions: Vec<String>,
    runner: R,
}

impl<R: ProcessRunner> ShaderCompiler<R> {
    /// Create a compiler, checking that the SDK and its `glslc` exist
    pub fn new(location: CompilerLocation, runner: R) -> Result<Self, ShaderError> {
        let compiler = match location {
            CompilerLocation::Sdk(root) => {
                if !root.is_dir() {
                    return Err(ShaderError::SdkMissing(root));
                }
                let glslc = sdk::glslc_path(&root)?;
                if !glslc.exists() {
                    return Err(ShaderError::CompilerMissing(glslc));
                }
                glslc
            }
            CompilerLocation::SearchPath => PathBuf::from(GLSLC),
        };

        Ok(Self {
            compiler,
            extensions: DEFAULT_STAGE_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
            runner,
        })
    }

    /// Replace the set of recognized stage extensions (given without the dot)
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    /// Resolved compiler executable
    pub fn compiler_path(&self) -> &Path {
        &self.compiler
    }

    /// Compile every stage source under `src` into `dst`
    ///
    /// `dst` is removed and recreated first. Shaders that fail to compile are reported in
    /// the summary and do not stop the batch.
    pub fn compile_all(&mut self, src: &Path, dst: &Path) -> Result<CompileSummary, ShaderError> {
        if !src.is_dir() {
            return Err(ShaderError::SourceMissing(src.to_path_buf()));
        }

        remove_path(dst).map_err(|source| ShaderError::ClearFailed {
            path: dst.to_path_buf(),
            source,
        })?;
        create_dir(dst)?;

        log::info!("Shader compile: {} -> {}", src.display(), dst.display());

        let mut summary = CompileSummary::default();
        self.compile_dir(src, Path::new(""), dst, &mut summary)?;

        log::info!(
            "Compiled {} of {} shader(s)",
            summary.compiled.len(),
            summary.total()
        );
        Ok(summary)
    }

    fn compile_dir(
        &mut self,
        dir: &Path,
        relative_dir: &Path,
        dst_root: &Path,
        summary: &mut CompileSummary,
    ) -> Result<(), ShaderError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Skipping unreadable directory {}: {}", dir.display(), e);
                return Ok(());
            }
        };

        let mut subdirs = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Error reading shader directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            if is_dir {
                subdirs.push(entry.file_name());
                continue;
            }

            // symlinks to directories are not followed
            if !path.is_file() || !self.is_stage_source(&entry.file_name()) {
                continue;
            }

            let job = self.plan(&path, &entry.file_name(), relative_dir, dst_root)?;
            self.compile_one(job, summary)?;
        }

        for name in subdirs {
            self.compile_dir(&dir.join(&name), &relative_dir.join(&name), dst_root, summary)?;
        }

        Ok(())
    }

    fn is_stage_source(&self, file_name: &OsStr) -> bool {
        let name = file_name.to_string_lossy();
        self.extensions.iter().any(|ext| {
            name.strip_suffix(ext.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }

    fn plan(
        &self,
        source: &Path,
        file_name: &OsStr,
        relative_dir: &Path,
        dst_root: &Path,
    ) -> Result<ShaderJob, ShaderError> {
        let out_dir = if relative_dir.as_os_str().is_empty() {
            dst_root.to_path_buf()
        } else {
            dst_root.join(relative_dir)
        };
        create_dir(&out_dir)?;

        let mut out_name = file_name.to_os_string();
        out_name.push(".");
        out_name.push(SPIRV_EXTENSION);

        Ok(ShaderJob {
            source: source.to_path_buf(),
            relative_dir: relative_dir.to_path_buf(),
            output: out_dir.join(out_name),
        })
    }

    fn compile_one(
        &mut self,
        job: ShaderJob,
        summary: &mut CompileSummary,
    ) -> Result<(), ShaderError> {
        let args: Vec<OsString> = vec![
            job.source.clone().into_os_string(),
            OsString::from("-o"),
            job.output.clone().into_os_string(),
        ];

        let output = match self.runner.run(&self.compiler, &args) {
            Ok(output) => output,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                return Err(ShaderError::CompilerNotFound {
                    program: self.compiler.clone(),
                    source,
                });
            }
            Err(source) => {
                return Err(ShaderError::SpawnFailed {
                    program: self.compiler.clone(),
                    source,
                });
            }
        };

        if output.success() {
            log::info!("Compiled: {} -> {}", job.source.display(), job.output.display());
            summary.compiled.push(job);
        } else {
            let code = output
                .code
                .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}"));
            log::error!("Error compiling {}: {}", job.source.display(), code);
            for line in output.stderr.lines().filter(|l| !l.trim().is_empty()) {
                log::error!("  {}", line);
            }
            summary.failed.push(CompileFailure {
                job,
                code: output.code,
                stderr: output.stderr,
            });
        }

        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<(), ShaderError> {
    fs::create_dir_all(path).map_err(|source| ShaderError::CreateDirFailed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessOutput;
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    /// Stands in for glslc: writes a fake SPIR-V blob, fails any source named `broken*`
    #[derive(Default)]
    struct FakeGlslc {
        calls: Vec<(PathBuf, Vec<OsString>)>,
        missing: bool,
    }

    impl ProcessRunner for FakeGlslc {
        fn run(&mut self, program: &Path, args: &[OsString]) -> io::Result<ProcessOutput> {
            self.calls.push((program.to_path_buf(), args.to_vec()));
            if self.missing {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no such file"));
            }

            let source = Path::new(&args[0]);
            let name = source.file_name().unwrap().to_string_lossy();
            if name.starts_with("broken") {
                return Ok(ProcessOutput {
                    code: Some(1),
                    stderr: format!("{}:3: error: syntax error\n", source.display()),
                });
            }

            fs::write(&args[2], b"\x03\x02\x23\x07").unwrap();
            Ok(ProcessOutput {
                code: Some(0),
                stderr: String::new(),
            })
        }
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn files_under(root: &Path) -> BTreeSet<PathBuf> {
        let mut files = BTreeSet::new();
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    pending.push(path);
                } else {
                    files.insert(path.strip_prefix(root).unwrap().to_path_buf());
                }
            }
        }
        files
    }

    fn search_path_compiler() -> ShaderCompiler<FakeGlslc> {
        ShaderCompiler::new(CompilerLocation::SearchPath, FakeGlslc::default()).unwrap()
    }

    #[test]
    fn test_only_stage_sources_compiled() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("shaders");
        write(&src.join("a.vert"), "void main() {}");
        write(&src.join("sub/b.frag"), "void main() {}");
        write(&src.join("c.txt"), "notes");
        let dst = tmp.path().join("out");

        let mut compiler = search_path_compiler();
        let summary = compiler.compile_all(&src, &dst).unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.compiled.len(), 2);
        let expected: BTreeSet<PathBuf> =
            [PathBuf::from("a.vert.spv"), Path::new("sub").join("b.frag.spv")].into();
        assert_eq!(files_under(&dst), expected);
    }

    #[test]
    fn test_compiler_arguments() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("shaders");
        write(&src.join("nested/deep/light.frag"), "void main() {}");
        let dst = tmp.path().join("out");

        let mut compiler = search_path_compiler();
        let summary = compiler.compile_all(&src, &dst).unwrap();

        let job = &summary.compiled[0];
        assert_eq!(job.relative_dir, Path::new("nested").join("deep"));
        assert_eq!(job.output, dst.join("nested/deep/light.frag.spv"));

        let (program, args) = &compiler.runner.calls[0];
        assert_eq!(program, Path::new("glslc"));
        assert_eq!(
            args,
            &vec![
                src.join("nested/deep/light.frag").into_os_string(),
                OsString::from("-o"),
                dst.join("nested/deep/light.frag.spv").into_os_string(),
            ]
        );
    }

    #[test]
    fn test_stale_output_removed() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("shaders");
        write(&src.join("a.vert"), "void main() {}");
        let dst = tmp.path().join("out");
        write(&dst.join("old.vert.spv"), "stale");
        write(&dst.join("gone/x.frag.spv"), "stale");

        let mut compiler = search_path_compiler();
        compiler.compile_all(&src, &dst).unwrap();

        let expected: BTreeSet<PathBuf> = [PathBuf::from("a.vert.spv")].into();
        assert_eq!(files_under(&dst), expected);
    }

    #[test]
    fn test_failed_shader_does_not_stop_batch() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("shaders");
        write(&src.join("broken.vert"), "void main() {");
        write(&src.join("ok.frag"), "void main() {}");
        write(&src.join("more/also_ok.vert"), "void main() {}");
        let dst = tmp.path().join("out");

        let mut compiler = search_path_compiler();
        let summary = compiler.compile_all(&src, &dst).unwrap();

        assert!(!summary.is_success());
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.compiled.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        let failure = &summary.failed[0];
        assert_eq!(failure.code, Some(1));
        assert!(failure.stderr.contains("syntax error"));
        assert!(failure.job.source.ends_with("broken.vert"));
        assert!(!dst.join("broken.vert.spv").exists());
    }

    #[test]
    fn test_compiler_not_found_is_fatal() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("shaders");
        write(&src.join("a.vert"), "void main() {}");
        write(&src.join("b.frag"), "void main() {}");

        let runner = FakeGlslc {
            missing: true,
            ..FakeGlslc::default()
        };
        let mut compiler = ShaderCompiler::new(CompilerLocation::SearchPath, runner).unwrap();
        let err = compiler.compile_all(&src, &tmp.path().join("out")).unwrap_err();

        assert!(matches!(err, ShaderError::CompilerNotFound { .. }));
        assert_eq!(compiler.runner.calls.len(), 1);
    }

    #[test]
    fn test_missing_source_rejected_before_clearing() {
        let tmp = tempdir().unwrap();
        let dst = tmp.path().join("out");
        write(&dst.join("keep.spv"), "keep");

        let mut compiler = search_path_compiler();
        let err = compiler.compile_all(&tmp.path().join("absent"), &dst).unwrap_err();

        assert!(matches!(err, ShaderError::SourceMissing(_)));
        assert!(dst.join("keep.spv").exists());
    }

    #[test]
    fn test_empty_source_tree_gives_empty_output() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("shaders");
        fs::create_dir_all(&src).unwrap();
        let dst = tmp.path().join("out");

        let summary = search_path_compiler().compile_all(&src, &dst).unwrap();

        assert_eq!(summary.total(), 0);
        assert!(dst.is_dir());
        assert!(files_under(&dst).is_empty());
    }

    #[test]
    fn test_custom_extensions() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("shaders");
        write(&src.join("cull.comp"), "void main() {}");
        write(&src.join("a.vert"), "void main() {}");
        write(&src.join("common.glsl"), "// include");
        write(&src.join("notcomp"), "");

        let mut compiler = search_path_compiler().with_extensions([".comp", "vert"]);
        let summary = compiler.compile_all(&src, &tmp.path().join("out")).unwrap();

        let names: BTreeSet<String> = summary
            .compiled
            .iter()
            .map(|job| job.output.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        let expected: BTreeSet<String> =
            ["a.vert.spv".to_string(), "cull.comp.spv".to_string()].into();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_sdk_root_missing() {
        let tmp = tempdir().unwrap();
        let result = ShaderCompiler::new(
            CompilerLocation::Sdk(tmp.path().join("VulkanSDK")),
            FakeGlslc::default(),
        );
        assert!(matches!(result, Err(ShaderError::SdkMissing(_))));
    }

    #[test]
    fn test_sdk_without_glslc() {
        let tmp = tempdir().unwrap();
        let result = ShaderCompiler::new(
            CompilerLocation::Sdk(tmp.path().to_path_buf()),
            FakeGlslc::default(),
        );
        assert!(matches!(result, Err(ShaderError::CompilerMissing(_))));
    }

    #[test]
    fn test_sdk_glslc_resolved() {
        let tmp = tempdir().unwrap();
        let glslc = sdk::glslc_path(tmp.path()).unwrap();
        write(&glslc, "");

        let compiler = ShaderCompiler::new(
            CompilerLocation::Sdk(tmp.path().to_path_buf()),
            FakeGlslc::default(),
        )
        .unwrap();
        assert_eq!(compiler.compiler_path(), glslc);
    }
}
