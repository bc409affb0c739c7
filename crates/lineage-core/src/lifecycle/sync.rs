//! Bringing branches up to date with their remote and their parent

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::config::SyncStrategy;
use crate::lineage::Hierarchy;
use crate::sync::SyncEngine;

use super::BranchLifecycle;
use super::undo::SyncSnapshot;

/// What a sync run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Actions taken, in order
    pub actions: Vec<String>,
    /// Branches left alone, with the reason
    pub skipped: Vec<String>,
    /// State before the run, for [`BranchLifecycle::undo_sync`]
    #[serde(default)]
    pub snapshot: SyncSnapshot,
}

impl SyncReport {
    fn action(&mut self, action: String) {
        tracing::info!("{action}");
        self.actions.push(action);
    }

    /// Nothing had to be done.
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }
}

impl BranchLifecycle<'_> {
    /// Sync `name` and every ancestor above it, root first.
    ///
    /// Fetches with prune, then for each branch takes in its remote-tracking
    /// branch and its parent (merging or rebasing, as configured) and pushes
    /// unpublished commits. Offline, nothing is fetched or pushed. The
    /// originally checked-out branch is restored afterwards, also on error,
    /// and the state before the run is kept for [`Self::undo_sync`].
    ///
    /// # Errors
    ///
    /// - `UnknownBranch` if `name` does not exist locally
    /// - `BrokenHierarchy` if its ancestor chain is broken
    /// - `MergeConflict` / `RebaseConflict` on conflicts (the operation is
    ///   aborted)
    pub fn sync_branch(&self, name: &str) -> Result<SyncReport> {
        self.require_local(name)?;
        let chain = SyncEngine::new(self.ctx).ancestor_chain(name)?;

        let mut lineage: Vec<String> = chain.into_iter().rev().collect();
        lineage.push(name.to_string());
        let plan = lineage
            .iter()
            .enumerate()
            .map(|(i, branch)| {
                let parent = i.checked_sub(1).map(|p| lineage[p].clone());
                (branch.clone(), parent)
            })
            .collect();

        self.run_sync(plan, SyncReport::default())
    }

    /// Sync every local branch, roots first and then by depth. Branches
    /// with a broken hierarchy are skipped and listed in the report.
    pub fn sync_all(&self) -> Result<SyncReport> {
        let engine = SyncEngine::new(self.ctx);
        let mut report = SyncReport::default();

        let mut plan = Vec::new();
        for branch in self.ctx.inspector().local_branches()? {
            match engine.ancestor_chain(&branch) {
                Ok(chain) => plan.push((chain.len(), branch, chain.first().cloned())),
                Err(e) => {
                    tracing::warn!(branch = %branch, error = %e, "Skipping branch");
                    report.skipped.push(format!("{branch}: {e}"));
                }
            }
        }
        plan.sort();

        let plan = plan
            .into_iter()
            .map(|(_, branch, parent)| (branch, parent))
            .collect();
        self.run_sync(plan, report)
    }

    fn run_sync(
        &self,
        plan: Vec<(String, Option<String>)>,
        mut report: SyncReport,
    ) -> Result<SyncReport> {
        let inspector = self.ctx.inspector();
        let remote = self.ctx.remote();
        let has_remote = inspector.remotes()?.iter().any(|name| name == remote);
        let online = has_remote && !self.ctx.config().offline;
        if online {
            self.ctx.commands().fetch(remote)?;
        } else if has_remote {
            tracing::info!(remote, "Offline, not fetching or pushing");
        } else {
            tracing::warn!(remote, "Remote not configured, syncing locally only");
        }

        let original = inspector.current_branch().ok();
        let mut hierarchy = self.ctx.load_hierarchy()?;
        let mut tips = BTreeMap::new();
        for (branch, _) in &plan {
            tips.insert(branch.clone(), inspector.commit_at(branch)?.to_string());
        }
        report.snapshot = SyncSnapshot {
            original: original.clone(),
            pushed: Vec::new(),
            tips,
            lineage: hierarchy.lineage().clone(),
        };

        let mut outcome = Ok(());
        for (branch, parent) in &plan {
            outcome = self.sync_one(
                branch,
                parent.as_deref(),
                (has_remote, online),
                &mut hierarchy,
                &mut report,
            );
            if outcome.is_err() {
                break;
            }
        }

        if let Some(original) = original
            && inspector.current_branch().ok().as_deref() != Some(original.as_str())
        {
            self.ctx.commands().checkout(&original)?;
        }
        let lineage_changed = hierarchy.lineage() != &report.snapshot.lineage;
        if lineage_changed {
            self.ctx.save_hierarchy(&hierarchy)?;
        }
        self.keep_snapshot(&report.snapshot, lineage_changed)?;

        outcome.map(|()| report)
    }

    /// Keep the snapshot of a run that changed something; a run that changed
    /// nothing leaves nothing to undo.
    fn keep_snapshot(&self, snapshot: &SyncSnapshot, lineage_changed: bool) -> Result<()> {
        let inspector = self.ctx.inspector();
        let mut tips_changed = false;
        for (branch, tip) in &snapshot.tips {
            if inspector.commit_at(branch)?.to_string() != *tip {
                tips_changed = true;
                break;
            }
        }

        let path = self.ctx.undo_path();
        if tips_changed || lineage_changed || !snapshot.pushed.is_empty() {
            snapshot.save(path)
        } else {
            SyncSnapshot::discard(path)
        }
    }

    fn sync_one(
        &self,
        branch: &str,
        parent: Option<&str>,
        (has_remote, online): (bool, bool),
        hierarchy: &mut Hierarchy,
        report: &mut SyncReport,
    ) -> Result<()> {
        let inspector = self.ctx.inspector();
        let commands = self.ctx.commands();
        let config = self.ctx.config();
        let remote = self.ctx.remote();
        let tracking = format!("{remote}/{branch}");
        let published = has_remote && inspector.has_remote_branch(remote, branch)?;
        let strategy = if hierarchy.is_root(branch) {
            config.perennial_strategy
        } else {
            config.feature_strategy
        };

        commands.checkout(branch)?;

        if published && inspector.divergence(branch, &tracking)?.behind > 0 {
            self.take_in(branch, &tracking, strategy, report)?;
        }

        if let Some(parent) = parent
            && inspector.divergence(branch, parent)?.behind > 0
        {
            self.take_in(branch, parent, strategy, report)?;
        }

        if !online {
            return Ok(());
        }
        if published {
            let divergence = inspector.divergence(branch, &tracking)?;
            if divergence.ahead > 0 && divergence.behind > 0 {
                // Only a rebase rewrites commits the remote already has
                commands.force_push(remote, branch)?;
                report.snapshot.pushed.push(branch.to_string());
                report.action(format!("force-pushed {branch} to {remote}"));
            } else if divergence.ahead > 0 {
                commands.push(remote, branch, false)?;
                report.snapshot.pushed.push(branch.to_string());
                report.action(format!("pushed {branch} to {remote}"));
            }
        } else if self.should_publish(branch, hierarchy)? {
            commands.push(remote, branch, true)?;
            hierarchy.set_tracks_remote(branch, true);
            report.snapshot.pushed.push(branch.to_string());
            report.action(format!("published {branch} to {remote}"));
        }
        Ok(())
    }

    fn take_in(
        &self,
        branch: &str,
        source: &str,
        strategy: SyncStrategy,
        report: &mut SyncReport,
    ) -> Result<()> {
        let commands = self.ctx.commands();
        match strategy {
            SyncStrategy::Merge => {
                commands.merge(branch, source)?;
                report.action(format!("merged {source} into {branch}"));
            }
            SyncStrategy::Rebase => {
                commands.rebase(branch, source)?;
                report.action(format!("rebased {branch} onto {source}"));
            }
        }
        Ok(())
    }

    /// Local-only branches are published when configured to, but a branch
    /// whose remote counterpart was deleted is never pushed again.
    fn should_publish(&self, branch: &str, hierarchy: &Hierarchy) -> Result<bool> {
        if !self.ctx.config().push_new_branches || hierarchy.is_root(branch) {
            return Ok(false);
        }
        let tracked = hierarchy
            .record(branch)
            .is_some_and(|record| record.tracks_remote);
        Ok(!tracked && self.ctx.inspector().upstream_of(branch)?.is_none())
    }
}
