//! SyncEngine implementation
//!
//! The engine compares branches against their remote counterpart or their
//! logical parent. It keeps no state between calls: every query reloads the
//! lineage file and reopens the repository.

use std::collections::BTreeSet;

use lineage_git::Divergence;

use crate::context::RepoContext;
use crate::lineage::Hierarchy;
use crate::{Error, Result};

use super::report::{BranchStatus, StatusReport};
use super::status::{Reference, SyncStatus};

/// Status plus the commit counts it was derived from, when there were any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Evaluation {
    status: SyncStatus,
    divergence: Option<Divergence>,
}

impl Evaluation {
    fn compared(divergence: Divergence) -> Self {
        Self {
            status: SyncStatus::from_divergence(divergence),
            divergence: Some(divergence),
        }
    }

    fn plain(status: SyncStatus) -> Self {
        Self {
            status,
            divergence: None,
        }
    }
}

/// Read-only status queries over one repository context.
pub struct SyncEngine<'a> {
    ctx: &'a RepoContext,
}

impl<'a> SyncEngine<'a> {
    pub fn new(ctx: &'a RepoContext) -> Self {
        Self { ctx }
    }

    /// Status of `branch` against `reference`.
    ///
    /// # Errors
    ///
    /// - `UnknownBranch` if `branch` does not exist locally
    /// - [`Error::BrokenHierarchy`] in parent mode when an ancestor is
    ///   missing from the store or the repository
    pub fn status_of(&self, branch: &str, reference: Reference) -> Result<SyncStatus> {
        let hierarchy = self.ctx.load_hierarchy()?;
        let local = self.ctx.inspector().local_branches()?;
        Ok(self.evaluate(branch, reference, &hierarchy, &local)?.status)
    }

    /// Ancestor chain of `branch` (nearest first), with every ancestor
    /// verified to exist as a local branch.
    pub fn ancestor_chain(&self, branch: &str) -> Result<Vec<String>> {
        let hierarchy = self.ctx.load_hierarchy()?;
        let local = self.ctx.inspector().local_branches()?;
        verified_chain(branch, &hierarchy, &local)
    }

    /// Number of non-root local branches out of sync with `reference`.
    ///
    /// Against the remote, branches that were never published are not
    /// counted. Errors are propagated, so a broken hierarchy fails the count
    /// in parent mode.
    pub fn count_out_of_sync(&self, reference: Reference) -> Result<usize> {
        let hierarchy = self.ctx.load_hierarchy()?;
        let local = self.ctx.inspector().local_branches()?;

        let mut count = 0;
        for branch in local.iter().filter(|name| !hierarchy.is_root(name)) {
            let evaluation = self.evaluate(branch, reference, &hierarchy, &local)?;
            if evaluation.status.is_out_of_sync(reference) {
                count += 1;
            }
        }
        tracing::debug!(%reference, count, "Counted out-of-sync branches");
        Ok(count)
    }

    /// Status of every local branch, roots included. Per-branch failures
    /// are recorded in the row instead of failing the report.
    pub fn report(&self, reference: Reference) -> Result<StatusReport> {
        let hierarchy = self.ctx.load_hierarchy()?;
        let local = self.ctx.inspector().local_branches()?;
        let current = self.ctx.inspector().current_branch().ok();

        let branches = local
            .iter()
            .map(|branch| {
                let root = hierarchy.is_root(branch);
                let parent = hierarchy.parent_of(branch).map(str::to_string);
                match self.evaluate(branch, reference, &hierarchy, &local) {
                    Ok(evaluation) => BranchStatus {
                        name: branch.clone(),
                        parent,
                        root,
                        status: Some(evaluation.status),
                        ahead: evaluation.divergence.map(|d| d.ahead),
                        behind: evaluation.divergence.map(|d| d.behind),
                        error: None,
                    },
                    Err(e) => {
                        tracing::warn!(branch = %branch, error = %e, "Cannot determine status");
                        BranchStatus {
                            name: branch.clone(),
                            parent,
                            root,
                            status: None,
                            ahead: None,
                            behind: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect();

        Ok(StatusReport {
            reference,
            current,
            branches,
        })
    }

    fn evaluate(
        &self,
        branch: &str,
        reference: Reference,
        hierarchy: &Hierarchy,
        local: &BTreeSet<String>,
    ) -> Result<Evaluation> {
        if !local.contains(branch) {
            return Err(lineage_git::Error::UnknownBranch {
                name: branch.to_string(),
            }
            .into());
        }
        match reference {
            Reference::Remote => self.remote_status(branch, hierarchy),
            Reference::Parent => self.parent_status(branch, hierarchy, local),
        }
    }

    fn remote_status(&self, branch: &str, hierarchy: &Hierarchy) -> Result<Evaluation> {
        let inspector = self.ctx.inspector();
        let remote = self.ctx.remote();

        if inspector.has_remote_branch(remote, branch)? {
            let divergence = inspector.divergence(branch, &format!("{remote}/{branch}"))?;
            return Ok(Evaluation::compared(divergence));
        }

        let recorded = hierarchy
            .record(branch)
            .is_some_and(|record| record.tracks_remote);
        if recorded || inspector.upstream_of(branch)?.is_some() {
            Ok(Evaluation::plain(SyncStatus::RemoteGone))
        } else {
            Ok(Evaluation::plain(SyncStatus::LocalOnly))
        }
    }

    fn parent_status(
        &self,
        branch: &str,
        hierarchy: &Hierarchy,
        local: &BTreeSet<String>,
    ) -> Result<Evaluation> {
        let chain = verified_chain(branch, hierarchy, local)?;
        let Some(parent) = chain.first() else {
            return Ok(Evaluation::plain(SyncStatus::InSync));
        };
        let divergence = self.ctx.inspector().divergence(branch, parent)?;
        Ok(Evaluation::compared(divergence))
    }
}

/// Store chain of `branch`, failing if an ancestor has no local branch.
fn verified_chain(
    branch: &str,
    hierarchy: &Hierarchy,
    local: &BTreeSet<String>,
) -> Result<Vec<String>> {
    let chain = hierarchy.ancestor_chain(branch)?;
    if let Some(missing) = chain.iter().find(|ancestor| !local.contains(*ancestor)) {
        return Err(Error::broken(
            branch,
            missing.as_str(),
            "ancestor branch no longer exists",
        ));
    }
    Ok(chain)
}
