//! TypeScript configuration supplied by the caller.
//!
//! Only the `compilerOptions` that change how sources are transpiled are honoured;
//! everything else in the document is ignored.

use std::path::Path;

use deno_ast::{
    DecoratorsTranspileOption, JsxAutomaticOptions, JsxClassicOptions, JsxRuntime,
    TranspileOptions,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::TsConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    pub jsx: Option<String>,
    pub jsx_factory: Option<String>,
    pub jsx_fragment_factory: Option<String>,
    pub jsx_import_source: Option<String>,
    pub experimental_decorators: Option<bool>,
    pub emit_decorator_metadata: Option<bool>,
    pub verbatim_module_syntax: Option<bool>,
}

impl CompilerOptions {
    /// Reads the tsconfig file and/or the inline override.
    ///
    /// When both are given the file is read first and each `compilerOptions` key of the
    /// inline document replaces the file's value for that key.
    pub fn load(
        tsconfig: Option<&Path>,
        tsconfig_raw: Option<&str>,
    ) -> Result<Self, TsConfigError> {
        let mut merged = Map::new();

        if let Some(path) = tsconfig {
            let text = std::fs::read_to_string(path).map_err(|source| TsConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            merged.extend(compiler_options_object(&text, &path.display().to_string())?);
        }
        if let Some(raw) = tsconfig_raw {
            merged.extend(compiler_options_object(raw, "inline tsconfig")?);
        }

        serde_json::from_value(Value::Object(merged)).map_err(|err| TsConfigError::Parse {
            origin: "compilerOptions".to_string(),
            message: err.to_string(),
        })
    }

    pub fn to_transpile_options(&self) -> Result<TranspileOptions, TsConfigError> {
        let mut options = TranspileOptions::default();

        options.jsx = match self.jsx.as_deref() {
            None | Some("react") => Some(JsxRuntime::Classic(JsxClassicOptions {
                factory: self
                    .jsx_factory
                    .clone()
                    .unwrap_or_else(|| "React.createElement".to_string()),
                fragment_factory: self
                    .jsx_fragment_factory
                    .clone()
                    .unwrap_or_else(|| "React.Fragment".to_string()),
            })),
            Some(jsx @ ("react-jsx" | "react-jsxdev")) => {
                Some(JsxRuntime::Automatic(JsxAutomaticOptions {
                    development: jsx == "react-jsxdev",
                    import_source: self.jsx_import_source.clone(),
                }))
            }
            Some("preserve") => None,
            Some(other) => return Err(TsConfigError::UnsupportedJsx(other.to_string())),
        };

        if self.experimental_decorators == Some(true) {
            options.decorators = DecoratorsTranspileOption::LegacyTypeScript {
                emit_metadata: self.emit_decorator_metadata.unwrap_or(false),
            };
        }
        if let Some(verbatim) = self.verbatim_module_syntax {
            options.verbatim_module_syntax = verbatim;
        }
        Ok(options)
    }
}

fn compiler_options_object(text: &str, origin: &str) -> Result<Map<String, Value>, TsConfigError> {
    let parse_error = |message: String| TsConfigError::Parse {
        origin: origin.to_string(),
        message,
    };

    let document = jsonc_parser::parse_to_serde_value(text, &Default::default())
        .map_err(|err| parse_error(err.to_string()))?;
    match document {
        None => Ok(Map::new()),
        Some(Value::Object(mut root)) => match root.remove("compilerOptions") {
            None => Ok(Map::new()),
            Some(Value::Object(options)) => Ok(options),
            Some(_) => Err(parse_error("`compilerOptions` must be an object".to_string())),
        },
        Some(_) => Err(parse_error("expected a JSON object".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_no_config_is_default() {
        assert_eq!(
            CompilerOptions::load(None, None).unwrap(),
            CompilerOptions::default()
        );
    }

    #[test]
    fn test_file_with_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tsconfig.json");
        std::fs::write(
            &path,
            r#"{
                // GJS has no React
                "compilerOptions": {
                    "jsxFactory": "Gtk.h",
                    "experimentalDecorators": true,
                },
                "include": ["src"]
            }"#,
        )
        .unwrap();

        let options = CompilerOptions::load(Some(&path), None).unwrap();
        assert_eq!(options.jsx_factory.as_deref(), Some("Gtk.h"));
        assert_eq!(options.experimental_decorators, Some(true));
    }

    #[test]
    fn test_raw_overrides_file_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tsconfig.json");
        std::fs::write(
            &path,
            r#"{"compilerOptions": {"jsxFactory": "h", "jsxFragmentFactory": "Fragment"}}"#,
        )
        .unwrap();

        let options = CompilerOptions::load(
            Some(&path),
            Some(r#"{"compilerOptions": {"jsxFactory": "createElement"}}"#),
        )
        .unwrap();
        assert_eq!(options.jsx_factory.as_deref(), Some("createElement"));
        assert_eq!(options.jsx_fragment_factory.as_deref(), Some("Fragment"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CompilerOptions::load(Some(&dir.path().join("tsconfig.json")), None).unwrap_err();
        assert!(matches!(err, TsConfigError::Read { .. }));
    }

    #[rstest]
    #[case("{")]
    #[case("[]")]
    #[case(r#"{"compilerOptions": 1}"#)]
    #[case(r#"{"compilerOptions": {"experimentalDecorators": "yes"}}"#)]
    fn test_malformed_raw(#[case] raw: &str) {
        let err = CompilerOptions::load(None, Some(raw)).unwrap_err();
        assert!(matches!(err, TsConfigError::Parse { .. }));
    }

    #[test]
    fn test_classic_jsx_factories() {
        let options = CompilerOptions {
            jsx_factory: Some("h".to_string()),
            ..Default::default()
        }
        .to_transpile_options()
        .unwrap();
        match options.jsx {
            Some(JsxRuntime::Classic(classic)) => {
                assert_eq!(classic.factory, "h");
                assert_eq!(classic.fragment_factory, "React.Fragment");
            }
            other => panic!("unexpected jsx runtime: {other:?}"),
        }
    }

    #[rstest]
    #[case("react-jsx", false)]
    #[case("react-jsxdev", true)]
    fn test_automatic_jsx(#[case] jsx: &str, #[case] development: bool) {
        let options = CompilerOptions {
            jsx: Some(jsx.to_string()),
            jsx_import_source: Some("gjsx".to_string()),
            ..Default::default()
        }
        .to_transpile_options()
        .unwrap();
        match options.jsx {
            Some(JsxRuntime::Automatic(automatic)) => {
                assert_eq!(automatic.development, development);
                assert_eq!(automatic.import_source.as_deref(), Some("gjsx"));
            }
            other => panic!("unexpected jsx runtime: {other:?}"),
        }
    }

    #[test]
    fn test_preserve_jsx() {
        let options = CompilerOptions {
            jsx: Some("preserve".to_string()),
            ..Default::default()
        }
        .to_transpile_options()
        .unwrap();
        assert!(options.jsx.is_none());
    }

    #[test]
    fn test_unsupported_jsx() {
        let err = CompilerOptions {
            jsx: Some("solid".to_string()),
            ..Default::default()
        }
        .to_transpile_options()
        .unwrap_err();
        assert!(matches!(err, TsConfigError::UnsupportedJsx(ref jsx) if jsx == "solid"));
    }

    #[test]
    fn test_legacy_decorators() {
        let options = CompilerOptions {
            experimental_decorators: Some(true),
            emit_decorator_metadata: Some(true),
            ..Default::default()
        }
        .to_transpile_options()
        .unwrap();
        assert!(matches!(
            options.decorators,
            DecoratorsTranspileOption::LegacyTypeScript {
                emit_metadata: true
            }
        ));
    }
}
