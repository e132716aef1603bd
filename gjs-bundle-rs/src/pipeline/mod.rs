//! Custom module resolution and content loading.
//!
//! Imports that name a custom scheme (`inline:`) or a compiled file type (`.scss`,
//! `.blp`) are claimed by a [`ResolveRule`], rewritten to an absolute path and tagged
//! with a [`Namespace`]. When the module graph later needs that module's source, the
//! namespace selects the [`ContentHook`] that produces it.
//!
//! # Architecture
//!
//! - `rule`: pure specifier matching and path joining
//! - `hook`: the three content hooks (file read, sass, blueprint-compiler)
//! - `registry`: the fixed, ordered rule/hook table handed to the module graph

mod hook;
mod registry;
mod rule;

use std::fmt;
use std::str::FromStr;

pub use hook::{ContentHook, InlineTextHook, LoadResult, MarkupCompileHook, StyleCompileHook};
pub use registry::PipelineRegistry;
pub(crate) use rule::join_normalized;
pub use rule::{ResolveRule, ResolvedModule};

/// Dispatch tag attached to a resolved module path.
///
/// `File` is the default namespace used for modules the pipeline does not claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    File,
    Inline,
    Sass,
    Blueprint,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::File => "file",
            Namespace::Inline => "inline",
            Namespace::Sass => "sass",
            Namespace::Blueprint => "blueprint",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "file" => Namespace::File,
            "inline" => Namespace::Inline,
            "sass" => Namespace::Sass,
            "blueprint" => Namespace::Blueprint,
            _ => return Err(()),
        })
    }
}

/// Executable names of the external compilers invoked by the content hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainConfig {
    pub sass: String,
    pub blueprint_compiler: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            sass: "sass".to_string(),
            blueprint_compiler: "blueprint-compiler".to_string(),
        }
    }
}
