// Copyright 2018-2024 the Deno authors. All rights reserved. MIT license.
// Adapted from deno_emit 0.46.0 for gjs-bundle

//! Code generation for a finished module graph using the swc bundler.

use std::collections::HashMap;
use std::rc::Rc;

use deno_ast::get_syntax;
use deno_ast::swc;
use deno_ast::swc::common::comments::SingleThreadedComments;
use deno_ast::swc::common::Mark;
use deno_ast::swc::ecma_visit::VisitMutWith;
use deno_ast::swc::parser::lexer::Lexer;
use deno_ast::swc::parser::StringInput;
use deno_ast::swc::transforms::resolver;
use deno_ast::Marks;
use deno_ast::MediaType;
use deno_ast::ModuleSpecifier;
use deno_ast::ParseDiagnostic;
use deno_ast::SourceMap;
use deno_ast::SourceTextInfo;
use deno_ast::TranspileOptions;
use deno_core::anyhow::{anyhow, Context, Result};
use deno_graph::{Module, ModuleGraph};

use super::bundle_hook::BundleHook;
use super::define::{Define, DefineReplacer};
use super::external::ExternalAllowlist;
use super::text::{strip_bom, transform_json_source};

#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    pub transpile_options: TranspileOptions,
    pub defines: Vec<Define>,
    pub minify: bool,
}

#[derive(Debug)]
pub struct BundleEmit {
    pub code: String,
}

struct BundleLoader<'a> {
    cm: &'a SourceMap,
    options: &'a EmitOptions,
    graph: &'a ModuleGraph,
}

impl swc::bundler::Load for BundleLoader<'_> {
    fn load(&self, file_name: &swc::common::FileName) -> Result<swc::bundler::ModuleData> {
        let swc::common::FileName::Url(specifier) = file_name else {
            return Err(anyhow!(
                "Received a request for unsupported filename {:?}",
                file_name
            ));
        };
        let (source, media_type) = match self.graph.get(specifier) {
            Some(Module::Js(m)) => (m.source.text.as_ref(), m.media_type),
            Some(Module::Json(m)) => (m.source.text.as_ref(), m.media_type),
            Some(Module::Npm(_) | Module::Node(_) | Module::External(_) | Module::Wasm(_)) => {
                return Err(anyhow!(
                    "Module \"{}\" was an unsupported module kind.",
                    specifier
                ));
            }
            None => {
                return Err(anyhow!(
                    "Module \"{}\" unexpectedly missing when bundling.",
                    specifier
                ));
            }
        };
        let (fm, module) = transpile_module(specifier, source, media_type, self.options, self.cm)?;
        Ok(swc::bundler::ModuleData {
            fm,
            module,
            helpers: Default::default(),
        })
    }
}

struct BundleResolver<'a>(&'a ModuleGraph);

impl swc::bundler::Resolve for BundleResolver<'_> {
    fn resolve(
        &self,
        referrer: &swc::common::FileName,
        specifier: &str,
    ) -> Result<swc::loader::resolve::Resolution> {
        let swc::common::FileName::Url(referrer) = referrer else {
            return Err(anyhow!(
                "An unexpected referrer was passed when bundling: {:?}",
                referrer
            ));
        };

        match self.0.resolve_dependency(specifier, referrer, false) {
            Some(specifier) => Ok(swc::loader::resolve::Resolution {
                filename: swc::common::FileName::Url(specifier.clone()),
                slug: None,
            }),
            None => Err(anyhow!(
                "Cannot resolve \"{}\" from \"{}\".",
                specifier,
                referrer
            )),
        }
    }
}

/// Literal import specifiers the swc bundler must leave untouched.
///
/// Allowlisted imports are matched by the text written in source, so the `external:`
/// graph specifier is unwrapped back to that text.
fn external_modules(graph: &ModuleGraph) -> Vec<String> {
    graph
        .modules()
        .filter_map(|m| match m {
            Module::External(_) => Some(
                ExternalAllowlist::literal(m.specifier())
                    .map(str::to_string)
                    .unwrap_or_else(|| m.specifier().to_string()),
            ),
            Module::Node(_) | Module::Npm(_) | Module::Wasm(_) => Some(m.specifier().to_string()),
            Module::Js(_) | Module::Json(_) => None,
        })
        .collect()
}

/// Given a valid module graph, generate the bundle as a single ES module in memory.
pub fn bundle_graph(graph: &ModuleGraph, options: &EmitOptions) -> Result<BundleEmit> {
    let root = graph
        .roots
        .first()
        .ok_or_else(|| anyhow!("No root module in graph"))?;

    let globals = swc::common::Globals::new();
    swc::common::GLOBALS.set(&globals, || {
        let cm = SourceMap::default();
        let loader = BundleLoader {
            graph,
            options,
            cm: &cm,
        };
        let resolver = BundleResolver(graph);
        let config = swc::bundler::Config {
            module: swc::bundler::ModuleType::Es,
            external_modules: external_modules(graph)
                .into_iter()
                .map(Into::into)
                .collect(),
            ..Default::default()
        };
        // This hook will rewrite the `import.meta` when bundling to give a consistent
        // behavior between bundled and unbundled code.
        let hook = Box::new(BundleHook);
        let mut bundler = swc::bundler::Bundler::new(
            &globals,
            cm.inner().clone(),
            loader,
            resolver,
            config,
            hook,
        );
        let mut entries = HashMap::new();
        entries.insert(
            "bundle".to_string(),
            swc::common::FileName::Url(root.clone()),
        );
        let output = bundler
            .bundle(entries)
            .context("Unable to output during bundling")?;
        let bundle = output
            .first()
            .ok_or_else(|| anyhow!("Bundler produced no output"))?;

        let mut buf = Vec::new();
        {
            // can't use struct expr because Config has #[non_exhaustive]
            let mut cfg = swc::codegen::Config::default();
            cfg.minify = options.minify;
            cfg.ascii_only = false;
            cfg.target = deno_ast::ES_VERSION;
            cfg.omit_last_semi = false;
            cfg.emit_assert_for_import_attributes = false;
            let wr = Box::new(swc::codegen::text_writer::JsWriter::new(
                cm.inner().clone(),
                "\n",
                &mut buf,
                None,
            ));
            let mut emitter = swc::codegen::Emitter {
                cfg,
                cm: cm.inner().clone(),
                comments: None,
                wr,
            };
            emitter
                .emit_module(&bundle.module)
                .context("Unable to emit during bundling.")?;
        }

        let mut code = shebang_file(graph)
            .map(|shebang| format!("{shebang}\n"))
            .unwrap_or_default();
        code.push_str(&String::from_utf8(buf).context("Emitted code is an invalid string.")?);
        Ok(BundleEmit { code })
    })
}

/// GJS entry points are often executable scripts; keep their interpreter line.
fn shebang_file(graph: &ModuleGraph) -> Option<String> {
    let module = graph.get(graph.roots.first()?)?.js()?;
    let first_line = module.source.text.lines().next()?;
    if first_line.starts_with("#!") {
        Some(first_line.to_string())
    } else {
        None
    }
}

/// Parses a source module, applies defines and transpiles it into an swc SourceFile.
fn transpile_module(
    specifier: &ModuleSpecifier,
    source: &str,
    media_type: MediaType,
    options: &EmitOptions,
    cm: &SourceMap,
) -> Result<(Rc<swc::common::SourceFile>, swc::ast::Module)> {
    let source = strip_bom(source);
    let source = if media_type == MediaType::Json {
        transform_json_source(source)
    } else {
        source.to_string()
    };
    let source_file = cm.new_source_file(specifier.clone(), source);
    let input = StringInput::from(&*source_file);
    let comments = SingleThreadedComments::default();
    let syntax = if media_type == MediaType::Json {
        get_syntax(MediaType::JavaScript)
    } else {
        get_syntax(media_type)
    };
    let lexer = Lexer::new(syntax, deno_ast::ES_VERSION, input, Some(&comments));
    let mut parser = swc::parser::Parser::new_from(lexer);
    let mut module = parser.parse_module().map_err(|e| {
        ParseDiagnostic::from_swc_error(
            e,
            specifier,
            SourceTextInfo::from_string(source_file.src.to_string()),
        )
    })?;
    let diagnostics = {
        let diagnostics = parser.take_errors();
        if diagnostics.is_empty() {
            Vec::new()
        } else {
            let info = SourceTextInfo::from_string(source_file.src.to_string());
            diagnostics
                .into_iter()
                .map(|e| ParseDiagnostic::from_swc_error(e, specifier, info.clone()))
                .collect::<Vec<_>>()
        }
    };

    let marks = Marks {
        top_level: Mark::fresh(Mark::root()),
        unresolved: Mark::new(),
    };
    // fold_program ends with a hygiene pass that discards the unresolved mark, so
    // defines run after a resolver pass of their own
    if !options.defines.is_empty() {
        module.visit_mut_with(&mut resolver(marks.unresolved, marks.top_level, true));
        module.visit_mut_with(&mut DefineReplacer::new(&options.defines, marks.unresolved));
    }
    let program = deno_ast::fold_program(
        swc::ast::Program::Module(module),
        &options.transpile_options,
        cm,
        &comments,
        &marks,
        Box::new(diagnostics.iter()),
    )?;
    let swc::ast::Program::Module(module) = program else {
        return Err(anyhow!("Module \"{}\" was transpiled to a script.", specifier));
    };
    Ok((source_file, module))
}
