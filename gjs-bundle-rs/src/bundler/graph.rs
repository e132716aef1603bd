use deno_graph::{BuildOptions, GraphKind, Module, ModuleGraph, ModuleSpecifier, Resolution};

use super::loader::PipelineLoader;
use super::resolver::PipelineResolver;
use crate::diagnostics::{BuildMessage, BuildMessageKind};

/// Builds the module graph for a single entry point.
///
/// deno_graph keeps going after individual module failures, so the returned graph
/// records every error encountered during the pass.
pub async fn build_graph(
    root: ModuleSpecifier,
    loader: &PipelineLoader,
    resolver: &PipelineResolver,
) -> ModuleGraph {
    let mut graph = ModuleGraph::new(GraphKind::CodeOnly);
    graph
        .build(
            vec![root],
            vec![],
            loader,
            BuildOptions {
                resolver: Some(resolver.as_resolver()),
                ..Default::default()
            },
        )
        .await;
    graph
}

/// Every load and resolution error in the graph, in specifier order.
pub fn graph_errors(graph: &ModuleGraph) -> Vec<BuildMessage> {
    let mut messages: Vec<BuildMessage> = graph
        .module_errors()
        .map(|err| BuildMessage::new(BuildMessageKind::Module, err.to_string()))
        .collect();

    for module in graph.modules() {
        let Module::Js(js) = module else {
            continue;
        };
        for dependency in js.dependencies.values() {
            if let Resolution::Err(err) = &dependency.maybe_code {
                messages.push(
                    BuildMessage::new(BuildMessageKind::Resolution, err.to_string())
                        .at(js.specifier.clone()),
                );
            }
        }
    }
    messages
}
