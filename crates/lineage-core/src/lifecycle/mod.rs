//! Branch Lifecycle Controller
//!
//! Creates, deletes and switches branches while keeping the lineage file in
//! step with the repository. Validation happens before any repository
//! mutation; the lineage file is saved as soon as the mutation succeeded.

mod sync;
mod undo;

pub use sync::SyncReport;
pub use undo::{SyncSnapshot, UNDO_FILE};

use serde::{Deserialize, Serialize};

use crate::context::RepoContext;
use crate::lineage::BranchRecord;
use crate::{Error, Result};

/// Which refs `delete_branch` removes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteScope {
    Local,
    Remote,
    #[default]
    Both,
}

impl DeleteScope {
    pub fn includes_local(self) -> bool {
        matches!(self, Self::Local | Self::Both)
    }

    pub fn includes_remote(self) -> bool {
        matches!(self, Self::Remote | Self::Both)
    }
}

/// Options for [`BranchLifecycle::create_branch`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Logical parent; defaults to the main branch
    pub parent: Option<String>,
    /// Commit to start from; defaults to the parent's tip
    pub start_point: Option<String>,
    /// Publish with upstream tracking right away
    pub push: bool,
    /// Switch to the new branch afterwards
    pub checkout: bool,
}

impl CreateOptions {
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_start_point(mut self, start_point: impl Into<String>) -> Self {
        self.start_point = Some(start_point.into());
        self
    }

    pub fn pushed(mut self) -> Self {
        self.push = true;
        self
    }

    pub fn checked_out(mut self) -> Self {
        self.checkout = true;
        self
    }
}

/// Branch mutations over one repository context.
pub struct BranchLifecycle<'a> {
    ctx: &'a RepoContext,
}

impl<'a> BranchLifecycle<'a> {
    pub fn new(ctx: &'a RepoContext) -> Self {
        Self { ctx }
    }

    /// Create `name` and record its parent.
    ///
    /// # Errors
    ///
    /// - `BranchAlreadyExists` if `name` exists locally
    /// - `UnknownBranch` if the parent does not exist locally
    /// - `UnknownRef` if an explicit start point does not resolve
    /// - [`Error::CycleDetected`] if stale records would make the edge cyclic
    pub fn create_branch(&self, name: &str, options: CreateOptions) -> Result<()> {
        let inspector = self.ctx.inspector();
        if inspector.has_local_branch(name)? {
            return Err(lineage_git::Error::BranchAlreadyExists {
                name: name.to_string(),
            }
            .into());
        }

        let parent = options
            .parent
            .unwrap_or_else(|| self.ctx.main_branch().to_string());
        self.require_local(&parent)?;
        let start_point = options.start_point.unwrap_or_else(|| parent.clone());
        inspector.commit_at(&start_point)?;

        let mut hierarchy = self.ctx.load_hierarchy()?;
        hierarchy.set_parent(name, &parent)?;
        hierarchy.insert(name, BranchRecord::new(parent.as_str()));

        self.ctx.commands().create_branch(name, &start_point)?;
        self.ctx.save_hierarchy(&hierarchy)?;

        if options.push {
            self.ctx.commands().push(self.ctx.remote(), name, true)?;
            hierarchy.set_tracks_remote(name, true);
            self.ctx.save_hierarchy(&hierarchy)?;
        }
        if options.checkout {
            self.ctx.commands().checkout(name)?;
        }
        Ok(())
    }

    /// Delete `name` locally, on the remote, or both.
    ///
    /// Deleting the checked-out branch first switches to its parent (or the
    /// main branch when the parent is gone). The remote branch goes first, so
    /// an unreachable remote leaves the clone untouched. The record is removed
    /// together with the local branch; children keep pointing at the deleted
    /// name.
    ///
    /// # Errors
    ///
    /// - [`Error::PerennialBranch`] for the main branch and perennials
    /// - `UnknownBranch` if none of the refs in `scope` exist
    /// - `RemoteUnreachable` if the remote branch cannot be deleted
    pub fn delete_branch(&self, name: &str, scope: DeleteScope) -> Result<()> {
        let mut hierarchy = self.ctx.load_hierarchy()?;
        if hierarchy.is_root(name) {
            return Err(Error::PerennialBranch {
                name: name.to_string(),
            });
        }

        let inspector = self.ctx.inspector();
        let remote = self.ctx.remote();
        let delete_local = scope.includes_local() && inspector.has_local_branch(name)?;
        let delete_remote = scope.includes_remote() && inspector.has_remote_branch(remote, name)?;
        if !delete_local && !delete_remote {
            let missing = match scope {
                DeleteScope::Remote => format!("{remote}/{name}"),
                DeleteScope::Local | DeleteScope::Both => name.to_string(),
            };
            return Err(lineage_git::Error::UnknownBranch { name: missing }.into());
        }

        // Remote first: a failure here leaves the clone untouched
        if delete_remote {
            self.ctx.commands().delete_remote_branch(remote, name)?;
        }
        if delete_local {
            if inspector.current_branch().ok().as_deref() == Some(name) {
                let target = match hierarchy.parent_of(name) {
                    Some(parent) if inspector.has_local_branch(parent)? => parent.to_string(),
                    _ => self.ctx.main_branch().to_string(),
                };
                tracing::info!(branch = name, target = %target, "Leaving branch before deletion");
                self.ctx.commands().checkout(&target)?;
            }
            self.ctx.commands().delete_local_branch(name)?;
            hierarchy.remove(name);
            self.ctx.save_hierarchy(&hierarchy)?;
        }
        Ok(())
    }

    /// Switch to `name`.
    pub fn checkout(&self, name: &str) -> Result<()> {
        self.require_local(name)?;
        self.ctx.commands().checkout(name)?;
        Ok(())
    }

    /// Re-parent `name` under `parent`. Both must exist locally.
    pub fn set_parent(&self, name: &str, parent: &str) -> Result<()> {
        self.require_local(name)?;
        self.require_local(parent)?;

        let mut hierarchy = self.ctx.load_hierarchy()?;
        if hierarchy.is_root(name) {
            return Err(Error::PerennialBranch {
                name: name.to_string(),
            });
        }
        hierarchy.set_parent(name, parent)?;
        self.ctx.save_hierarchy(&hierarchy)
    }

    /// Mark `name` perennial in the lineage file. Returns `false` if it
    /// already was perennial.
    pub fn mark_perennial(&self, name: &str) -> Result<bool> {
        let mut hierarchy = self.ctx.load_hierarchy()?;
        let changed = hierarchy.mark_perennial(name);
        if changed {
            tracing::info!(branch = name, "Marked perennial");
            self.ctx.save_hierarchy(&hierarchy)?;
        }
        Ok(changed)
    }

    /// Remove a perennial mark from the lineage file. Returns `false` if
    /// there was no mark (configured perennials cannot be unmarked here).
    pub fn unmark_perennial(&self, name: &str) -> Result<bool> {
        let mut hierarchy = self.ctx.load_hierarchy()?;
        let changed = hierarchy.unmark_perennial(name);
        if changed {
            tracing::info!(branch = name, "Removed perennial mark");
            self.ctx.save_hierarchy(&hierarchy)?;
        }
        Ok(changed)
    }

    fn require_local(&self, name: &str) -> Result<()> {
        if self.ctx.inspector().has_local_branch(name)? {
            Ok(())
        } else {
            Err(lineage_git::Error::UnknownBranch {
                name: name.to_string(),
            }
            .into())
        }
    }
}
