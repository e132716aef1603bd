use deno_graph::ModuleSpecifier;

/// URL scheme under which allowlisted imports travel through the module graph.
pub const EXTERNAL_SCHEME: &str = "external";

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExternalPattern {
    /// A bare name, matching itself and any `name/...` subpath.
    Exact(String),
    /// A pattern with a single `*`, matching any text in its place.
    Wildcard { prefix: String, suffix: String },
}

impl ExternalPattern {
    fn parse(pattern: &str) -> Self {
        match pattern.split_once('*') {
            Some((prefix, suffix)) => ExternalPattern::Wildcard {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
            None => ExternalPattern::Exact(pattern.to_string()),
        }
    }

    fn matches(&self, specifier: &str) -> bool {
        match self {
            ExternalPattern::Exact(name) => specifier
                .strip_prefix(name.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
            ExternalPattern::Wildcard { prefix, suffix } => {
                specifier.len() >= prefix.len() + suffix.len()
                    && specifier.starts_with(prefix.as_str())
                    && specifier.ends_with(suffix.as_str())
            }
        }
    }
}

/// Import specifiers that are left as runtime imports instead of being bundled.
#[derive(Debug, Clone, Default)]
pub struct ExternalAllowlist {
    patterns: Vec<ExternalPattern>,
}

impl ExternalAllowlist {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|pattern| ExternalPattern::parse(pattern.as_ref()))
                .collect(),
        }
    }

    pub fn is_external(&self, specifier: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(specifier))
    }

    /// Wraps a literal import specifier into a graph specifier (`external:gi://Gtk`).
    pub fn to_specifier(specifier: &str) -> Option<ModuleSpecifier> {
        ModuleSpecifier::parse(&format!("{EXTERNAL_SCHEME}:{specifier}")).ok()
    }

    /// The literal import specifier carried by an `external:` graph specifier.
    pub fn literal(specifier: &ModuleSpecifier) -> Option<&str> {
        // the query (`gi://Adw?version=1`) is part of the literal, so slice the
        // serialized URL rather than taking its path
        specifier
            .as_str()
            .strip_prefix(EXTERNAL_SCHEME)?
            .strip_prefix(':')
    }
}
