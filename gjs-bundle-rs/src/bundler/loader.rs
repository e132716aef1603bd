//! Loader handed to deno_graph.
//!
//! Every load runs on tokio's blocking pool: the file reads and compiler invocations
//! behind it block, and deno_graph polls many loads at once.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use deno_graph::source::{LoadError, LoadFuture, LoadOptions, LoadResponse, Loader};
use deno_graph::ModuleSpecifier;

use super::external::ExternalAllowlist;
use super::text::transform_text_source;
use crate::error::HookError;
use crate::pipeline::{Namespace, PipelineRegistry, ResolvedModule};

/// How a default-namespace file is handed to the graph, keyed by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinLoader {
    /// JavaScript that may contain JSX.
    Jsx,
    /// Opaque text exported as a string.
    Text,
}

/// Extension (with leading dot) to loader.
pub type LoaderMap = BTreeMap<String, BuiltinLoader>;

const JAVASCRIPT_CONTENT_TYPE: &str = "application/javascript";
const JSX_CONTENT_TYPE: &str = "text/jsx";

/// Module source ready for the graph.
#[derive(Debug, PartialEq, Eq)]
struct GraphSource {
    code: String,
    /// `None` lets deno_graph infer the media type from the extension.
    content_type: Option<&'static str>,
    watched_files: BTreeSet<PathBuf>,
}

impl GraphSource {
    fn text(text: &str, watched_files: BTreeSet<PathBuf>) -> Self {
        Self {
            code: transform_text_source(text),
            content_type: Some(JAVASCRIPT_CONTENT_TYPE),
            watched_files,
        }
    }
}

pub struct PipelineLoader {
    registry: Arc<PipelineRegistry>,
    loaders: Arc<LoaderMap>,
    watched_files: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl PipelineLoader {
    pub fn new(registry: Arc<PipelineRegistry>, loaders: Arc<LoaderMap>) -> Self {
        Self {
            registry,
            loaders,
            watched_files: Default::default(),
        }
    }

    /// Union of the watched files of every module loaded so far.
    pub fn watched_files(&self) -> BTreeSet<PathBuf> {
        self.watched_files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Loader for PipelineLoader {
    fn load(&self, specifier: &ModuleSpecifier, _options: LoadOptions) -> LoadFuture {
        let specifier = specifier.clone();

        if ExternalAllowlist::literal(&specifier).is_some() {
            return Box::pin(async move { Ok(Some(LoadResponse::External { specifier })) });
        }

        // Anything that is neither a file nor a pipeline namespace is not found
        let Some(module) = ResolvedModule::from_specifier(&specifier) else {
            return Box::pin(async move { Ok(None) });
        };

        let registry = self.registry.clone();
        let loaders = self.loaders.clone();
        let watched_files = self.watched_files.clone();
        Box::pin(async move {
            let loaded =
                tokio::task::spawn_blocking(move || load_module(&registry, &loaders, &module))
                    .await
                    .map_err(|err| LoadError::Other(Arc::new(io::Error::other(err))))?;

            match loaded {
                Ok(Some(source)) => {
                    watched_files
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend(source.watched_files);
                    let maybe_headers = source.content_type.map(|content_type| {
                        let mut headers = HashMap::new();
                        headers.insert("content-type".to_string(), content_type.to_string());
                        headers
                    });
                    Ok(Some(LoadResponse::Module {
                        specifier,
                        maybe_headers,
                        content: Arc::from(source.code.into_bytes()),
                        mtime: None,
                    }))
                }
                Ok(None) => Ok(None),
                Err(err) => Err(LoadError::Other(Arc::new(io::Error::from(err)))),
            }
        })
    }
}

fn load_module(
    registry: &PipelineRegistry,
    loaders: &LoaderMap,
    module: &ResolvedModule,
) -> Result<Option<GraphSource>, HookError> {
    if module.namespace == Namespace::File {
        return load_file(loaders, &module.absolute_path);
    }

    let loaded = registry.load(module)?;
    log::debug!(
        "{} produced {} bytes, watching {:?}",
        module.absolute_path.display(),
        loaded.content.len(),
        loaded.watched_files
    );
    // hook output is always delivered as text, never re-parsed
    Ok(Some(GraphSource::text(&loaded.content, loaded.watched_files)))
}

fn load_file(loaders: &LoaderMap, path: &Path) -> Result<Option<GraphSource>, HookError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(HookError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let code = String::from_utf8(bytes).map_err(|source| HookError::InvalidUtf8 {
        path: path.to_path_buf(),
        source,
    })?;

    let watched_files = BTreeSet::from([path.to_path_buf()]);
    let loader = path
        .extension()
        .and_then(|extension| loaders.get(&format!(".{}", extension.to_string_lossy())));
    Ok(Some(match loader {
        Some(BuiltinLoader::Text) => GraphSource::text(&code, watched_files),
        Some(BuiltinLoader::Jsx) => GraphSource {
            code,
            content_type: Some(JSX_CONTENT_TYPE),
            watched_files,
        },
        None => GraphSource {
            code,
            content_type: None,
            watched_files,
        },
    }))
}
