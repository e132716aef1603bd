//! JavaScript bundler for gjs-bundle.
//!
//! This module wires the custom resolution pipeline into deno_graph and emits the
//! resulting graph as one ES module with the swc bundler:
//! 1. Build a module graph, resolving and loading through the pipeline
//! 2. Transpile TypeScript/JSX and substitute compile-time defines
//! 3. Bundle all modules into a single ES module, leaving allowlisted imports as is
//!
//! # Architecture
//!
//! - `resolver`/`loader`: deno_graph seams backed by the `PipelineRegistry`
//! - `external`: allowlist of runtime-provided imports
//! - `graph`: graph construction and error collection
//! - `emit`: core bundling logic using SWC bundler
//! - `define`: compile-time constant substitution
//! - `bundle_hook`: `import.meta` rewriting
//! - `text`: source text helpers

mod bundle_hook;
mod define;
mod emit;
mod external;
mod graph;
mod loader;
mod resolver;
mod text;

pub use define::Define;
pub use emit::{bundle_graph, BundleEmit, EmitOptions};
pub use external::{ExternalAllowlist, EXTERNAL_SCHEME};
pub use graph::{build_graph, graph_errors};
pub use loader::{BuiltinLoader, LoaderMap, PipelineLoader};
pub use resolver::PipelineResolver;
