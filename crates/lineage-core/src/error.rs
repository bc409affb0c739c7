//! Error types for lineage-core

use std::path::PathBuf;

/// Result type for lineage-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lineage-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Setting the parent would make the hierarchy cyclic
    #[error("Cannot make '{parent}' the parent of '{branch}': '{parent}' descends from '{branch}' (cycle)")]
    CycleDetected { branch: String, parent: String },

    /// A branch's ancestry does not reach a root branch
    #[error("Broken hierarchy for '{branch}': {reason} ('{missing}')")]
    BrokenHierarchy {
        branch: String,
        missing: String,
        reason: String,
    },

    /// Root branches cannot be deleted or re-parented through the lifecycle
    #[error("'{name}' is a main or perennial branch")]
    PerennialBranch { name: String },

    /// `undo` found no snapshot of a previous sync
    #[error("Nothing to undo: no sync has changed any branch since the last undo")]
    NothingToUndo,

    /// The lineage file exists but cannot be used
    #[error("Lineage error: {message}")]
    LineageError { message: String },

    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parsed but holds an unusable value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Git error from lineage-git
    #[error(transparent)]
    Git(#[from] lineage_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    pub(crate) fn broken(
        branch: impl Into<String>,
        missing: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::BrokenHierarchy {
            branch: branch.into(),
            missing: missing.into(),
            reason: reason.into(),
        }
    }
}
