use std::path::{Component, Path, PathBuf};

use deno_graph::ModuleSpecifier;

use super::Namespace;

/// An absolute filesystem path tagged with the namespace that will load it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedModule {
    pub absolute_path: PathBuf,
    pub namespace: Namespace,
}

impl ResolvedModule {
    pub fn new(absolute_path: impl Into<PathBuf>, namespace: Namespace) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            namespace,
        }
    }

    /// Encodes the module as a graph specifier.
    ///
    /// The default namespace maps to a `file://` URL, every other namespace becomes the
    /// URL scheme (`sass:///abs/styles.scss`). Returns `None` for relative paths.
    pub fn to_specifier(&self) -> Option<ModuleSpecifier> {
        let file_url = ModuleSpecifier::from_file_path(&self.absolute_path).ok()?;
        match self.namespace {
            Namespace::File => Some(file_url),
            namespace => {
                ModuleSpecifier::parse(&format!("{}://{}", namespace, file_url.path())).ok()
            }
        }
    }

    /// Inverse of [`ResolvedModule::to_specifier`].
    pub fn from_specifier(specifier: &ModuleSpecifier) -> Option<Self> {
        let namespace: Namespace = specifier.scheme().parse().ok()?;
        let absolute_path = match namespace {
            Namespace::File => specifier.to_file_path().ok()?,
            _ => ModuleSpecifier::parse(&format!("file://{}", specifier.path()))
                .ok()?
                .to_file_path()
                .ok()?,
        };
        Some(Self {
            absolute_path,
            namespace,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Detector {
    /// Literal scheme prefix, stripped before joining.
    Prefix(&'static str),
    /// Case-sensitive file suffix, kept in the joined path.
    Suffix(&'static str),
}

/// Decides whether a specifier belongs to a custom namespace.
///
/// Rules never touch the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveRule {
    namespace: Namespace,
    detector: Detector,
}

impl ResolveRule {
    /// `inline:<relative path>`
    pub const INLINE: ResolveRule = ResolveRule {
        namespace: Namespace::Inline,
        detector: Detector::Prefix("inline:"),
    };

    /// `*.scss`
    pub const SASS: ResolveRule = ResolveRule {
        namespace: Namespace::Sass,
        detector: Detector::Suffix(".scss"),
    };

    /// `*.blp`
    pub const BLUEPRINT: ResolveRule = ResolveRule {
        namespace: Namespace::Blueprint,
        detector: Detector::Suffix(".blp"),
    };

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn matches(&self, specifier: &str, importer_dir: &Path) -> Option<ResolvedModule> {
        let relative = match self.detector {
            Detector::Prefix(prefix) => specifier.strip_prefix(prefix)?,
            Detector::Suffix(suffix) if specifier.ends_with(suffix) => specifier,
            Detector::Suffix(_) => return None,
        };
        Some(ResolvedModule::new(
            join_normalized(importer_dir, relative),
            self.namespace,
        ))
    }
}

/// Joins `relative` onto `base` and lexically cleans the result.
///
/// `..` pops a component and a leading separator in `relative` does not discard
/// `base`, so the result always stays rooted at `base`'s root.
pub(crate) fn join_normalized(base: &Path, relative: &str) -> PathBuf {
    let mut joined = PathBuf::new();
    for component in base.components() {
        push_component(&mut joined, component);
    }
    for component in Path::new(relative).components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {}
            component => push_component(&mut joined, component),
        }
    }
    joined
}

fn push_component(path: &mut PathBuf, component: Component<'_>) {
    match component {
        Component::CurDir => {}
        Component::ParentDir => {
            if path.file_name().is_some() {
                path.pop();
            }
        }
        component => path.push(component),
    }
}
