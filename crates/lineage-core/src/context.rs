//! Repository context handle
//!
//! A [`RepoContext`] is the explicit handle every core operation runs
//! against: one working copy, its resolved configuration, and the location of
//! its lineage file. Several contexts (one per clone) can coexist in one
//! process without sharing any state.

use std::path::{Path, PathBuf};

use lineage_git::{GitCli, RefInspector, RepoCommands};

use crate::Result;
use crate::config::{BranchRoles, ConfigResolver, ResolvedConfig};
use crate::lifecycle::UNDO_FILE;
use crate::lineage::{Hierarchy, LINEAGE_FILE, Lineage};

/// Handle on one working copy.
#[derive(Debug, Clone)]
pub struct RepoContext {
    inspector: RefInspector,
    commands: RepoCommands,
    config: ResolvedConfig,
    roles: BranchRoles,
    lineage_path: PathBuf,
    undo_path: PathBuf,
}

impl RepoContext {
    /// Open the working copy rooted at `root`, resolving configuration from
    /// the standard locations.
    ///
    /// # Errors
    ///
    /// Returns `NotARepository` if `root` is not a git working copy, or a
    /// configuration error.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = ConfigResolver::new(&root).resolve()?;
        Self::with_config(root, config)
    }

    /// Open the working copy containing `path` (any subdirectory works).
    pub fn discover(path: &Path) -> Result<Self> {
        let inspector = RefInspector::discover(path)?;
        Self::open(inspector.root().to_path_buf())
    }

    /// Open with an explicit configuration.
    pub fn with_config(root: impl Into<PathBuf>, config: ResolvedConfig) -> Result<Self> {
        let root = root.into();
        let inspector = RefInspector::new(&root);
        let git_dir = inspector.git_dir()?;
        let roles = config.roles()?;
        tracing::debug!(root = %root.display(), main = %config.main_branch, "Opened repository context");

        Ok(Self {
            commands: RepoCommands::new(GitCli::new(&root)),
            inspector,
            config,
            roles,
            lineage_path: git_dir.join(LINEAGE_FILE),
            undo_path: git_dir.join(UNDO_FILE),
        })
    }

    /// Working copy root.
    pub fn root(&self) -> &Path {
        self.inspector.root()
    }

    pub fn inspector(&self) -> &RefInspector {
        &self.inspector
    }

    pub fn commands(&self) -> &RepoCommands {
        &self.commands
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Remote used for publishing and status.
    pub fn remote(&self) -> &str {
        &self.config.remote
    }

    /// Name of the main branch.
    pub fn main_branch(&self) -> &str {
        &self.config.main_branch
    }

    /// Location of the lineage file.
    pub fn lineage_path(&self) -> &Path {
        &self.lineage_path
    }

    /// Location of the snapshot taken by the last sync.
    pub fn undo_path(&self) -> &Path {
        &self.undo_path
    }

    /// Read the hierarchy from disk. Never cached: each call sees the
    /// latest saved state.
    pub fn load_hierarchy(&self) -> Result<Hierarchy> {
        let lineage = Lineage::load_or_default(&self.lineage_path)?;
        Ok(Hierarchy::new(lineage, self.roles.clone()))
    }

    /// Persist the hierarchy.
    pub fn save_hierarchy(&self, hierarchy: &Hierarchy) -> Result<()> {
        hierarchy.lineage().save(&self.lineage_path)
    }
}
