use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use deno_graph::ModuleSpecifier;

use crate::bundler::{
    build_graph, bundle_graph, graph_errors, BuiltinLoader, Define, EmitOptions,
    ExternalAllowlist, LoaderMap, PipelineLoader, PipelineResolver,
};
use crate::diagnostics::{BuildFailure, BuildMessage, BuildMessageKind};
use crate::pipeline::{join_normalized, PipelineRegistry, ToolchainConfig};
use crate::tsconfig::CompilerOptions;

/// Imports provided by the GJS runtime itself; these stay as import statements in the bundle.
pub const EXTERNAL_MODULES: &[&str] = &[
    "console",
    "system",
    "cairo",
    "gettext",
    "file://*",
    "gi://*",
    "resource://*",
];

/// Global identifier replaced with the entry file's directory.
pub const SRC_DEFINE: &str = "SRC";

pub const BUILTIN_LOADERS: &[(&str, BuiltinLoader)] =
    &[(".js", BuiltinLoader::Jsx), (".css", BuiltinLoader::Text)];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleConfig {
    pub entry_path: PathBuf,
    pub output_path: PathBuf,
    pub tsconfig: Option<PathBuf>,
    pub tsconfig_raw: Option<String>,
    pub minify: bool,
    pub toolchain: ToolchainConfig,
}

impl BundleConfig {
    pub fn new(entry_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            entry_path: entry_path.into(),
            output_path: output_path.into(),
            ..Default::default()
        }
    }

    pub fn with_tsconfig(mut self, tsconfig: impl Into<PathBuf>) -> Self {
        self.tsconfig = Some(tsconfig.into());
        self
    }

    pub fn with_tsconfig_raw(mut self, tsconfig_raw: impl Into<String>) -> Self {
        self.tsconfig_raw = Some(tsconfig_raw.into());
        self
    }

    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = minify;
        self
    }

    pub fn with_toolchain(mut self, toolchain: ToolchainConfig) -> Self {
        self.toolchain = toolchain;
        self
    }
}

/// A bundle that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArtifact {
    pub output_path: PathBuf,
    /// Every file read to produce the bundle.
    pub inputs: BTreeSet<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Written(BundleArtifact),
    Failed(BuildFailure),
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Written(_))
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            BuildOutcome::Written(_) => 0,
            BuildOutcome::Failed(_) => 1,
        }
    }
}

impl From<BuildFailure> for BuildOutcome {
    fn from(failure: BuildFailure) -> Self {
        BuildOutcome::Failed(failure)
    }
}

/// Drives one build from entry file to output file.
#[derive(Debug, Clone)]
pub struct BundleOrchestrator {
    config: BundleConfig,
}

impl BundleOrchestrator {
    pub fn new(config: BundleConfig) -> Self {
        Self { config }
    }

    /// Resolves, loads and bundles the entry file, writing the output only when no
    /// error was reported.
    pub async fn build(&self) -> BuildOutcome {
        match self.try_build().await {
            Ok(artifact) => BuildOutcome::Written(artifact),
            Err(failure) => BuildOutcome::Failed(failure),
        }
    }

    async fn try_build(&self) -> Result<BundleArtifact, BuildFailure> {
        let transpile_options = CompilerOptions::load(
            self.config.tsconfig.as_deref(),
            self.config.tsconfig_raw.as_deref(),
        )
        .and_then(|options| options.to_transpile_options())
        .map_err(|err| config_failure(err.to_string()))?;

        let entry_path = absolute_entry_path(&self.config.entry_path)?;
        let root = ModuleSpecifier::from_file_path(&entry_path).map_err(|_| {
            config_failure(format!(
                "Entry path {} cannot be expressed as a URL",
                entry_path.display()
            ))
        })?;
        let src_dir = entry_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let registry = Arc::new(PipelineRegistry::new(&self.config.toolchain));
        let externals = Arc::new(ExternalAllowlist::new(EXTERNAL_MODULES.iter().copied()));
        let loaders: LoaderMap = BUILTIN_LOADERS
            .iter()
            .map(|(extension, loader)| (extension.to_string(), *loader))
            .collect();
        let resolver = PipelineResolver::new(registry.clone(), externals);
        let loader = PipelineLoader::new(registry, Arc::new(loaders));

        log::debug!("Building module graph from {root}");
        let graph = build_graph(root, &loader, &resolver).await;
        if let Some(failure) = BuildFailure::new(graph_errors(&graph)) {
            return Err(failure);
        }

        let emit_options = EmitOptions {
            transpile_options,
            defines: vec![Define::new(
                SRC_DEFINE,
                src_dir.to_string_lossy().into_owned(),
            )],
            minify: self.config.minify,
        };
        let emitted = bundle_graph(&graph, &emit_options)
            .map_err(|err| emit_failure(format!("{err:#}")))?;

        let output_path = &self.config.output_path;
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                emit_failure(format!("Failed to create {}: {err}", parent.display()))
            })?;
        }
        std::fs::write(output_path, emitted.code.as_bytes()).map_err(|err| {
            emit_failure(format!("Failed to write {}: {err}", output_path.display()))
        })?;

        let inputs = loader.watched_files();
        log::info!(
            "Wrote {} ({} bytes, {} inputs)",
            output_path.display(),
            emitted.code.len(),
            inputs.len()
        );
        Ok(BundleArtifact {
            output_path: output_path.clone(),
            inputs,
        })
    }
}

fn config_failure(text: String) -> BuildFailure {
    BuildFailure::single(BuildMessage::new(BuildMessageKind::Config, text))
}

fn emit_failure(text: String) -> BuildFailure {
    BuildFailure::single(BuildMessage::new(BuildMessageKind::Emit, text))
}

fn absolute_entry_path(entry_path: &Path) -> Result<PathBuf, BuildFailure> {
    let base = if entry_path.is_absolute() {
        entry_path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| config_failure(format!("Cannot read current directory: {err}")))?
            .join(entry_path)
    };
    Ok(join_normalized(&base, ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("gettext")]
    #[case("console")]
    #[case("gi://Gtk?version=4.0")]
    #[case("resource:///org/example/app/main.js")]
    #[case("file:///usr/share/app/lib.js")]
    fn test_runtime_modules_are_external(#[case] specifier: &str) {
        let externals = ExternalAllowlist::new(EXTERNAL_MODULES.iter().copied());
        assert!(externals.is_external(specifier));
    }

    #[rstest]
    #[case("./gettext.js")]
    #[case("cairo-extra")]
    #[case("https://example.com/mod.js")]
    fn test_other_modules_are_bundled(#[case] specifier: &str) {
        let externals = ExternalAllowlist::new(EXTERNAL_MODULES.iter().copied());
        assert!(!externals.is_external(specifier));
    }

    #[test]
    fn test_entry_path_is_normalized() {
        assert_eq!(
            absolute_entry_path(Path::new("/app/src/../main.js")).unwrap(),
            PathBuf::from("/app/main.js")
        );
    }

    #[test]
    fn test_exit_codes() {
        let written = BuildOutcome::Written(BundleArtifact {
            output_path: PathBuf::from("out.js"),
            inputs: BTreeSet::new(),
        });
        assert!(written.is_success());
        assert_eq!(written.exit_code(), 0);

        let failed = BuildOutcome::from(config_failure("bad".to_string()));
        assert!(!failed.is_success());
        assert_eq!(failed.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_malformed_tsconfig_fails_before_reading_entry() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.js");
        let config = BundleConfig::new(dir.path().join("missing.js"), &output)
            .with_tsconfig_raw("{ not json");

        let BuildOutcome::Failed(failure) = BundleOrchestrator::new(config).build().await else {
            panic!("expected failure");
        };
        assert_eq!(failure.messages().len(), 1);
        assert_eq!(failure.messages()[0].kind, BuildMessageKind::Config);
        assert!(!output.exists());
    }
}
