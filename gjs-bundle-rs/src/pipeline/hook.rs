use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

use crate::error::HookError;
use crate::process::ExternalProcessRunner;

/// Text produced for one module, plus the files it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    pub content: String,
    /// Always contains at least the loaded path.
    pub watched_files: BTreeSet<PathBuf>,
}

impl LoadResult {
    fn for_path(content: String, path: &Path) -> Self {
        Self {
            content,
            watched_files: BTreeSet::from([path.to_path_buf()]),
        }
    }
}

/// Produces replacement module content for a resolved absolute path.
///
/// Hooks are invoked concurrently from blocking worker threads and must not share
/// mutable state between invocations.
pub trait ContentHook: fmt::Debug + Send + Sync {
    fn load(&self, path: &Path) -> Result<LoadResult, HookError>;
}

/// Loads a file verbatim as text.
#[derive(Debug, Default, Clone)]
pub struct InlineTextHook;

impl ContentHook for InlineTextHook {
    fn load(&self, path: &Path) -> Result<LoadResult, HookError> {
        let bytes = std::fs::read(path).map_err(|source| HookError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|source| HookError::InvalidUtf8 {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(LoadResult::for_path(content, path))
    }
}

/// Compiles a stylesheet with `sass <path> -I <dir>`.
#[derive(Debug, Clone)]
pub struct StyleCompileHook {
    runner: ExternalProcessRunner,
}

impl StyleCompileHook {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            runner: ExternalProcessRunner::new(program),
        }
    }
}

impl ContentHook for StyleCompileHook {
    fn load(&self, path: &Path) -> Result<LoadResult, HookError> {
        let include_dir = path.parent().unwrap_or(path);
        // sass warns when run from the compiled file's own directory
        let stdout = self
            .runner
            .run(
                [path.as_os_str(), OsStr::new("-I"), include_dir.as_os_str()],
                Some(Path::new(MAIN_SEPARATOR_STR)),
            )
            .map_err(|source| HookError::Compile {
                path: path.to_path_buf(),
                source,
            })?;
        trimmed_output(stdout, path)
    }
}

/// Compiles a UI definition with `blueprint-compiler compile <path>`.
#[derive(Debug, Clone)]
pub struct MarkupCompileHook {
    runner: ExternalProcessRunner,
}

impl MarkupCompileHook {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            runner: ExternalProcessRunner::new(program),
        }
    }
}

impl ContentHook for MarkupCompileHook {
    fn load(&self, path: &Path) -> Result<LoadResult, HookError> {
        let stdout = self
            .runner
            .run([OsStr::new("compile"), path.as_os_str()], None)
            .map_err(|source| HookError::Compile {
                path: path.to_path_buf(),
                source,
            })?;
        trimmed_output(stdout, path)
    }
}

fn trimmed_output(stdout: Vec<u8>, path: &Path) -> Result<LoadResult, HookError> {
    let text = String::from_utf8(stdout).map_err(|source| HookError::InvalidUtf8 {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadResult::for_path(text.trim().to_string(), path))
}
