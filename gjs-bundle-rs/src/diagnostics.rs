use std::fmt;

use deno_graph::ModuleSpecifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMessageKind {
    /// Invalid caller-supplied configuration (tsconfig, entry path).
    Config,
    /// A module could not be loaded, including every content hook failure.
    Module,
    /// An import could not be resolved.
    Resolution,
    /// Parsing, transpiling, code generation or writing the artifact failed.
    Emit,
}

impl fmt::Display for BuildMessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildMessageKind::Config => "config",
            BuildMessageKind::Module => "module",
            BuildMessageKind::Resolution => "resolution",
            BuildMessageKind::Emit => "emit",
        })
    }
}

/// One structured build error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMessage {
    pub kind: BuildMessageKind,
    /// Module the error was reported in, when known.
    pub location: Option<ModuleSpecifier>,
    pub text: String,
}

impl BuildMessage {
    pub fn new(kind: BuildMessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            location: None,
            text: text.into(),
        }
    }

    pub fn at(mut self, location: ModuleSpecifier) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for BuildMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "[{}] {} (in {})", self.kind, self.text, location),
            None => write!(f, "[{}] {}", self.kind, self.text),
        }
    }
}

/// The ordered, non-empty list of errors that failed a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFailure {
    messages: Vec<BuildMessage>,
}

impl BuildFailure {
    /// Returns `None` for an empty list: no errors is not a failure.
    pub fn new(messages: Vec<BuildMessage>) -> Option<Self> {
        (!messages.is_empty()).then_some(Self { messages })
    }

    pub fn single(message: BuildMessage) -> Self {
        Self {
            messages: vec![message],
        }
    }

    pub fn messages(&self) -> &[BuildMessage] {
        &self.messages
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, message) in self.messages.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{message}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_not_a_failure() {
        assert_eq!(BuildFailure::new(vec![]), None);
    }

    #[test]
    fn test_display_keeps_order() {
        let failure = BuildFailure::new(vec![
            BuildMessage::new(BuildMessageKind::Module, "first")
                .at(ModuleSpecifier::parse("sass:///app/a.scss").unwrap()),
            BuildMessage::new(BuildMessageKind::Resolution, "second"),
        ])
        .unwrap();
        assert_eq!(
            failure.to_string(),
            "[module] first (in sass:///app/a.scss)\n[resolution] second"
        );
    }
}
