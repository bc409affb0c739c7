//! Error types for lineage-git

use std::path::PathBuf;

/// Result type for lineage-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lineage-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Unknown ref '{name}'")]
    UnknownRef { name: String },

    #[error("Branch '{name}' not found")]
    UnknownBranch { name: String },

    #[error("Branch '{name}' already exists")]
    BranchAlreadyExists { name: String },

    #[error("HEAD is detached; no current branch")]
    DetachedHead,

    #[error("Remote '{remote}' is unreachable: {message}")]
    RemoteUnreachable { remote: String, message: String },

    #[error("Merging '{source_ref}' into '{branch}' resulted in conflicts; merge aborted")]
    MergeConflict { branch: String, source_ref: String },

    #[error("Rebasing '{branch}' onto '{onto}' resulted in conflicts; rebase aborted")]
    RebaseConflict { branch: String, onto: String },

    #[error("Command `git {command}` failed with exit code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
