//! Resolver handed to deno_graph.
//!
//! Order of precedence for every import edge:
//! 1. the external allowlist (left as a runtime import)
//! 2. the pipeline's custom rules (first match wins)
//! 3. plain URL resolution against the importing module

use std::path::{Path, PathBuf};
use std::sync::Arc;

use deno_graph::source::{ResolutionKind, ResolveError, Resolver};
use deno_graph::{ModuleSpecifier, Range};

use super::external::ExternalAllowlist;
use crate::pipeline::{PipelineRegistry, ResolvedModule};

#[derive(Debug)]
pub struct PipelineResolver {
    registry: Arc<PipelineRegistry>,
    externals: Arc<ExternalAllowlist>,
}

impl PipelineResolver {
    pub fn new(registry: Arc<PipelineRegistry>, externals: Arc<ExternalAllowlist>) -> Self {
        Self {
            registry,
            externals,
        }
    }

    pub fn as_resolver(&self) -> &dyn Resolver {
        self
    }

    fn resolve_specifier(
        &self,
        specifier: &str,
        referrer: &ModuleSpecifier,
    ) -> Option<ModuleSpecifier> {
        if self.externals.is_external(specifier) {
            log::trace!("{specifier} is external");
            return ExternalAllowlist::to_specifier(specifier);
        }

        let importer_dir = importer_dir(referrer)?;
        let resolved = self.registry.resolve(specifier, &importer_dir)?;
        log::trace!(
            "{specifier} resolved to {} in namespace {}",
            resolved.absolute_path.display(),
            resolved.namespace
        );
        resolved.to_specifier()
    }
}

impl Resolver for PipelineResolver {
    fn resolve(
        &self,
        specifier: &str,
        referrer_range: &Range,
        _mode: ResolutionKind,
    ) -> Result<ModuleSpecifier, ResolveError> {
        if let Some(resolved) = self.resolve_specifier(specifier, &referrer_range.specifier) {
            return Ok(resolved);
        }
        deno_graph::resolve_import(specifier, &referrer_range.specifier).map_err(|err| err.into())
    }
}

fn importer_dir(referrer: &ModuleSpecifier) -> Option<PathBuf> {
    let module = ResolvedModule::from_specifier(referrer)?;
    module.absolute_path.parent().map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Namespace, ToolchainConfig};
    use rstest::rstest;

    fn resolver() -> PipelineResolver {
        PipelineResolver::new(
            Arc::new(PipelineRegistry::new(&ToolchainConfig::default())),
            Arc::new(ExternalAllowlist::new(["gettext", "gi://*"])),
        )
    }

    fn referrer() -> ModuleSpecifier {
        ModuleSpecifier::parse("file:///app/src/main.js").unwrap()
    }

    #[rstest]
    #[case("inline:readme.txt", "inline:///app/src/readme.txt")]
    #[case("./styles.scss", "sass:///app/src/styles.scss")]
    #[case("../ui/window.blp", "blueprint:///app/ui/window.blp")]
    #[case("gettext", "external:gettext")]
    #[case("gi://Gtk?version=4.0", "external:gi://Gtk?version=4.0")]
    fn test_claimed_specifiers(#[case] specifier: &str, #[case] expected: &str) {
        let resolved = resolver().resolve_specifier(specifier, &referrer()).unwrap();
        assert_eq!(resolved.as_str(), expected);
    }

    #[rstest]
    #[case("./util.js")]
    #[case("./theme.css")]
    #[case("lodash")]
    fn test_unclaimed_specifiers(#[case] specifier: &str) {
        assert_eq!(resolver().resolve_specifier(specifier, &referrer()), None);
    }

    #[test]
    fn test_custom_rules_apply_relative_to_namespaced_importer() {
        let referrer = ResolvedModule::new("/app/src/styles/main.scss", Namespace::Sass)
            .to_specifier()
            .unwrap();
        let resolved = resolver()
            .resolve_specifier("inline:notes.txt", &referrer)
            .unwrap();
        assert_eq!(resolved.as_str(), "inline:///app/src/styles/notes.txt");
    }

    #[test]
    fn test_importer_without_path_declines_custom_rules() {
        let referrer = ModuleSpecifier::parse("https://example.com/mod.js").unwrap();
        assert_eq!(
            resolver().resolve_specifier("inline:notes.txt", &referrer),
            None
        );
    }
}
