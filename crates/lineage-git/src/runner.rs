//! Command execution primitive used for every repository mutation

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// Captured result of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, trimmed
    pub stdout: String,

    /// Standard error, trimmed
    pub stderr: String,

    /// Process exit code (`-1` when terminated by a signal)
    pub exit_code: i32,
}

impl CommandOutput {
    /// Whether the command exited with code zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Convert a non-zero exit into [`Error::CommandFailed`].
    pub fn into_result(self, args: &[&str]) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(Error::CommandFailed {
                command: args.join(" "),
                code: self.exit_code,
                stderr: self.stderr,
            })
        }
    }
}

/// Runs version-control commands inside one working copy.
///
/// Mutations never assume a particular binary beyond this primitive, which
/// keeps them testable against a scripted runner.
pub trait CommandRunner {
    /// Run a command and capture its output. A non-zero exit is not an error
    /// at this level; callers decide what failure means.
    fn run(&self, args: &[&str]) -> Result<CommandOutput>;

    /// Directory the commands run in.
    fn working_dir(&self) -> &Path;
}

/// [`CommandRunner`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    dir: PathBuf,
}

impl GitCli {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CommandRunner for GitCli {
    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        tracing::debug!(dir = %self.dir.display(), ?args, "git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .output()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    fn working_dir(&self) -> &Path {
        &self.dir
    }
}
