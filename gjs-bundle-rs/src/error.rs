use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::string::FromUtf8Error;

use crate::pipeline::Namespace;

/// Failure to run an external tool to completion.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Failure of a content hook to materialize a module.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to compile {}: {source}", path.display())]
    Compile {
        path: PathBuf,
        #[source]
        source: ProcessError,
    },

    #[error("{} did not produce valid UTF-8: {source}", path.display())]
    InvalidUtf8 {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },

    #[error("no content hook is registered for namespace `{0}`")]
    UnregisteredNamespace(Namespace),
}

// deno_graph carries loader failures as io errors
impl From<HookError> for io::Error {
    fn from(err: HookError) -> Self {
        io::Error::other(err)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TsConfigError {
    #[error("failed to read tsconfig {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse tsconfig from {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("unsupported `jsx` compiler option: `{0}`")]
    UnsupportedJsx(String),
}
