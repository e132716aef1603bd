use std::path::Path;

use super::hook::{ContentHook, InlineTextHook, LoadResult, MarkupCompileHook, StyleCompileHook};
use super::rule::{ResolveRule, ResolvedModule};
use super::ToolchainConfig;
use crate::error::HookError;

#[derive(Debug)]
struct PipelineEntry {
    rule: ResolveRule,
    hook: Box<dyn ContentHook>,
}

/// Ordered table of resolve rules and the content hook serving each rule's namespace.
///
/// Built once per build and read-only afterwards, so it can be shared across the
/// graph's concurrent resolve and load calls behind an `Arc`.
#[derive(Debug)]
pub struct PipelineRegistry {
    entries: Vec<PipelineEntry>,
}

impl PipelineRegistry {
    /// The fixed `inline`, `sass`, `blueprint` pipeline.
    pub fn new(toolchain: &ToolchainConfig) -> Self {
        Self {
            entries: vec![
                PipelineEntry {
                    rule: ResolveRule::INLINE,
                    hook: Box::new(InlineTextHook),
                },
                PipelineEntry {
                    rule: ResolveRule::SASS,
                    hook: Box::new(StyleCompileHook::new(toolchain.sass.clone())),
                },
                PipelineEntry {
                    rule: ResolveRule::BLUEPRINT,
                    hook: Box::new(MarkupCompileHook::new(
                        toolchain.blueprint_compiler.clone(),
                    )),
                },
            ],
        }
    }

    /// First matching rule wins. `None` leaves the specifier to default resolution.
    pub fn resolve(&self, specifier: &str, importer_dir: &Path) -> Option<ResolvedModule> {
        self.entries
            .iter()
            .find_map(|entry| entry.rule.matches(specifier, importer_dir))
    }

    pub fn load(&self, module: &ResolvedModule) -> Result<LoadResult, HookError> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.rule.namespace() == module.namespace)
            .ok_or(HookError::UnregisteredNamespace(module.namespace))?;
        log::debug!(
            "loading {} in namespace {}",
            module.absolute_path.display(),
            module.namespace
        );
        entry.hook.load(&module.absolute_path)
    }
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::new(&ToolchainConfig::default())
    }
}
