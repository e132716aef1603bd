//! Blocking invocation of external compilers.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::ProcessError;

/// Runs a single external executable and captures its standard output.
///
/// Standard error is inherited, so diagnostics from the child show up live on the
/// host's error stream whether or not the child succeeds.
#[derive(Debug, Clone)]
pub struct ExternalProcessRunner {
    program: String,
}

impl ExternalProcessRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Runs the program to completion, returning its stdout.
    ///
    /// Blocks the calling thread. There is no timeout: a hung child hangs the caller.
    pub fn run<I, S>(&self, args: I, current_dir: Option<&Path>) -> Result<Vec<u8>, ProcessError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if let Some(dir) = current_dir {
            command.current_dir(dir);
        }

        log::debug!("running {:?}", command);
        let output = command.output().map_err(|source| ProcessError::Launch {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ProcessError::Failed {
                program: self.program.clone(),
                status: output.status,
            });
        }
        Ok(output.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let runner = ExternalProcessRunner::new("echo");
        let stdout = runner.run(["hello"], None).unwrap();
        assert_eq!(stdout, b"hello\n");
    }

    #[test]
    fn test_runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ExternalProcessRunner::new("pwd");
        let stdout = runner.run::<_, &str>([], Some(dir.path())).unwrap();
        let printed = String::from_utf8(stdout).unwrap();
        assert_eq!(
            Path::new(printed.trim()).canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_non_zero_exit_is_failure() {
        let runner = ExternalProcessRunner::new("false");
        let err = runner.run::<_, &str>([], None).unwrap_err();
        assert!(matches!(err, ProcessError::Failed { ref program, .. } if program == "false"));
    }

    #[test]
    fn test_missing_program_is_launch_failure() {
        let runner = ExternalProcessRunner::new("gjs-bundle-no-such-program");
        let err = runner.run(["x"], None).unwrap_err();
        assert!(matches!(err, ProcessError::Launch { .. }));
        assert!(err.to_string().contains("gjs-bundle-no-such-program"));
    }
}
