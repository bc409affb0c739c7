//! Repository mutations expressed on top of a [`CommandRunner`]

use crate::runner::{CommandOutput, CommandRunner, GitCli};
use crate::{Error, Result};

/// Mutating git operations: branch creation, checkout, push, deletion, fetch
/// and merge.
///
/// Branch names are always placed after `--` or in positions where git
/// cannot mistake them for flags.
#[derive(Debug, Clone)]
pub struct RepoCommands<R: CommandRunner = GitCli> {
    runner: R,
}

impl<R: CommandRunner> RepoCommands<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// The underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner.run(args)?.into_result(args)
    }

    /// Run a command that talks to `remote`. Rejections (non-fast-forward)
    /// stay command failures; anything else means the remote could not be
    /// reached.
    fn git_remote(&self, remote: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = self.runner.run(args)?;
        if output.success() {
            return Ok(output);
        }
        if output.stderr.contains("[rejected]") {
            return output.into_result(args);
        }
        Err(Error::RemoteUnreachable {
            remote: remote.to_string(),
            message: output.stderr,
        })
    }

    /// Create `name` at `start_point` without switching to it.
    pub fn create_branch(&self, name: &str, start_point: &str) -> Result<()> {
        tracing::info!(branch = name, start_point, "Creating branch");
        self.git(&["branch", "--", name, start_point])?;
        Ok(())
    }

    /// Switch the working copy to `name`.
    pub fn checkout(&self, name: &str) -> Result<()> {
        tracing::info!(branch = name, "Checking out branch");
        self.git(&["checkout", name, "--"])?;
        Ok(())
    }

    /// Force-delete the local branch `name`.
    pub fn delete_local_branch(&self, name: &str) -> Result<()> {
        tracing::info!(branch = name, "Deleting local branch");
        self.git(&["branch", "-D", "--", name])?;
        Ok(())
    }

    /// Publish `name` to `remote`, optionally recording it as upstream.
    pub fn push(&self, remote: &str, name: &str, set_upstream: bool) -> Result<()> {
        tracing::info!(branch = name, remote, set_upstream, "Pushing branch");
        let mut args = vec!["push"];
        if set_upstream {
            args.push("-u");
        }
        args.extend([remote, name]);
        self.git_remote(remote, &args)?;
        Ok(())
    }

    /// Overwrite `name` on `remote` after a rebase, refusing if the remote
    /// moved since the last fetch.
    pub fn force_push(&self, remote: &str, name: &str) -> Result<()> {
        tracing::info!(branch = name, remote, "Force-pushing branch");
        self.git_remote(remote, &["push", "--force-with-lease", remote, name])?;
        Ok(())
    }

    /// Delete `name` on `remote`. Git drops the matching remote-tracking ref
    /// on success.
    pub fn delete_remote_branch(&self, remote: &str, name: &str) -> Result<()> {
        tracing::info!(branch = name, remote, "Deleting remote branch");
        self.git_remote(remote, &["push", remote, "--delete", name])?;
        Ok(())
    }

    /// Fetch `remote`, pruning remote-tracking refs deleted upstream.
    pub fn fetch(&self, remote: &str) -> Result<()> {
        tracing::info!(remote, "Fetching");
        self.git_remote(remote, &["fetch", "--prune", remote])?;
        Ok(())
    }

    /// Point the branch `name` at `commit`. `name` must not be checked out.
    pub fn reset_branch(&self, name: &str, commit: &str) -> Result<()> {
        tracing::info!(branch = name, commit, "Resetting branch");
        self.git(&["branch", "-f", "--", name, commit])?;
        Ok(())
    }

    /// Reset the checked-out branch and working copy to `commit`.
    pub fn reset_hard(&self, commit: &str) -> Result<()> {
        tracing::info!(commit, "Resetting working copy");
        self.git(&["reset", "--hard", commit])?;
        Ok(())
    }

    /// Merge `source` into the checked-out `branch`.
    ///
    /// On conflicts the merge is aborted, leaving the working copy as it was,
    /// and [`Error::MergeConflict`] is returned.
    pub fn merge(&self, branch: &str, source: &str) -> Result<()> {
        tracing::info!(branch, source, "Merging");
        let args = ["merge", "--no-edit", source];
        let output = self.runner.run(&args)?;
        if output.success() {
            return Ok(());
        }

        if output.stdout.contains("CONFLICT") || output.stderr.contains("CONFLICT") {
            let abort = self.runner.run(&["merge", "--abort"])?;
            if !abort.success() {
                tracing::warn!(branch, stderr = %abort.stderr, "Failed to abort merge");
            }
            return Err(Error::MergeConflict {
                branch: branch.to_string(),
                source_ref: source.to_string(),
            });
        }

        output.into_result(&args).map(|_| ())
    }

    /// Replay the checked-out `branch` on top of `onto`.
    ///
    /// On conflicts the rebase is aborted and [`Error::RebaseConflict`] is
    /// returned.
    pub fn rebase(&self, branch: &str, onto: &str) -> Result<()> {
        tracing::info!(branch, onto, "Rebasing");
        let args = ["rebase", onto];
        let output = self.runner.run(&args)?;
        if output.success() {
            return Ok(());
        }

        if output.stdout.contains("CONFLICT")
            || output.stderr.contains("CONFLICT")
            || output.stderr.contains("could not apply")
        {
            let abort = self.runner.run(&["rebase", "--abort"])?;
            if !abort.success() {
                tracing::warn!(branch, stderr = %abort.stderr, "Failed to abort rebase");
            }
            return Err(Error::RebaseConflict {
                branch: branch.to_string(),
                onto: onto.to_string(),
            });
        }

        output.into_result(&args).map(|_| ())
    }
}
