// Allow uninlined format args for cleaner bail!/anyhow! macros
#![allow(clippy::uninlined_format_args)]
#![doc = include_str!("../README.md")]

pub mod bundler;
pub mod diagnostics;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod process;
pub mod tsconfig;

pub use deno_core::anyhow;
pub use diagnostics::{BuildFailure, BuildMessage, BuildMessageKind};
pub use orchestrator::{BuildOutcome, BundleArtifact, BundleConfig, BundleOrchestrator};
pub use pipeline::ToolchainConfig;
