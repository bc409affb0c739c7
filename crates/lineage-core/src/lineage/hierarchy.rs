//! Branch forest queries and edits over a [`Lineage`]

use std::collections::{BTreeSet, VecDeque};

use crate::config::BranchRoles;
use crate::{Error, Result};

use super::{BranchRecord, Lineage};

/// The branch forest: persisted lineage records combined with the root and
/// perennial classification from configuration.
///
/// Roots (the main branch and every perennial branch) terminate ancestor
/// chains. A perennial branch may still carry a recorded parent; it is
/// ignored while the branch stays perennial.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    lineage: Lineage,
    roles: BranchRoles,
}

impl Hierarchy {
    pub fn new(lineage: Lineage, roles: BranchRoles) -> Self {
        Self { lineage, roles }
    }

    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    pub fn roles(&self) -> &BranchRoles {
        &self.roles
    }

    /// Name of the main branch.
    pub fn main(&self) -> &str {
        self.roles.main()
    }

    /// Perennial by configuration or by an explicit mark in the store.
    pub fn is_perennial(&self, branch: &str) -> bool {
        self.roles.is_perennial(branch) || self.lineage.perennials().contains(branch)
    }

    /// Main or perennial.
    pub fn is_root(&self, branch: &str) -> bool {
        branch == self.roles.main() || self.is_perennial(branch)
    }

    /// Mark `branch` perennial. Returns `false` if it already was a root.
    pub fn mark_perennial(&mut self, branch: &str) -> bool {
        if self.is_root(branch) {
            return false;
        }
        self.lineage.perennials_mut().insert(branch.to_string())
    }

    /// Remove the perennial mark set in the store. Perennials coming from
    /// configuration stay perennial.
    pub fn unmark_perennial(&mut self, branch: &str) -> bool {
        self.lineage.perennials_mut().remove(branch)
    }

    /// All perennial names known to the store and configuration (the
    /// configured regex is not expanded).
    pub fn perennials(&self) -> BTreeSet<String> {
        self.roles
            .perennials()
            .iter()
            .chain(self.lineage.perennials())
            .cloned()
            .collect()
    }

    /// Logical parent of `branch`. `None` for roots and for branches without
    /// a recorded parent.
    pub fn parent_of(&self, branch: &str) -> Option<&str> {
        if self.is_root(branch) {
            return None;
        }
        self.lineage.record(branch)?.parent.as_deref()
    }

    /// Record for `branch`, if any.
    pub fn record(&self, branch: &str) -> Option<&BranchRecord> {
        self.lineage.record(branch)
    }

    /// Insert or replace the parent edge of `branch`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] if `parent` is `branch` itself or one
    /// of its recorded descendants.
    pub fn set_parent(&mut self, branch: &str, parent: &str) -> Result<()> {
        if branch == parent || self.recorded_ancestors(parent).contains(branch) {
            return Err(Error::CycleDetected {
                branch: branch.to_string(),
                parent: parent.to_string(),
            });
        }

        let record = self.lineage.record_mut(branch);
        let previous = record.parent.replace(parent.to_string());
        tracing::debug!(branch, parent, ?previous, "Set parent");
        Ok(())
    }

    /// Every name reachable from `branch` by following recorded parent
    /// links, regardless of roots. Stops on corrupted loops.
    fn recorded_ancestors(&self, branch: &str) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut current = branch;
        while let Some(parent) = self
            .lineage
            .record(current)
            .and_then(|record| record.parent.as_deref())
        {
            if !seen.insert(parent.to_string()) {
                break;
            }
            current = parent;
        }
        seen
    }

    /// Parents of `branch` up to the first root, nearest first.
    ///
    /// A root has an empty chain.
    ///
    /// # Errors
    ///
    /// - [`Error::BrokenHierarchy`] when a non-root branch on the way has no
    ///   record or no recorded parent (for example a parent that was deleted)
    /// - [`Error::CycleDetected`] when persisted links loop
    pub fn ancestor_chain(&self, branch: &str) -> Result<Vec<String>> {
        let mut chain = Vec::new();
        if self.is_root(branch) {
            return Ok(chain);
        }

        let mut visited = BTreeSet::from([branch.to_string()]);
        let mut current = branch.to_string();
        loop {
            let record = self.lineage.record(&current).ok_or_else(|| {
                if current == branch {
                    Error::broken(branch, &current, "branch has no lineage record")
                } else {
                    Error::broken(branch, &current, "ancestor is no longer tracked")
                }
            })?;
            let parent = record
                .parent
                .clone()
                .ok_or_else(|| Error::broken(branch, &current, "no parent recorded"))?;

            if !visited.insert(parent.clone()) {
                return Err(Error::CycleDetected {
                    branch: current,
                    parent,
                });
            }

            chain.push(parent.clone());
            if self.is_root(&parent) {
                return Ok(chain);
            }
            current = parent;
        }
    }

    /// Branches whose recorded parent is `branch`, in name order.
    pub fn children_of(&self, branch: &str) -> Vec<String> {
        self.lineage
            .records()
            .filter(|(_, record)| record.parent.as_deref() == Some(branch))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// All recorded descendants of `branch`, breadth first.
    pub fn descendants_of(&self, branch: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut seen = BTreeSet::from([branch.to_string()]);
        let mut queue = VecDeque::from([branch.to_string()]);
        while let Some(current) = queue.pop_front() {
            for child in self.children_of(&current) {
                if seen.insert(child.clone()) {
                    result.push(child.clone());
                    queue.push_back(child);
                }
            }
        }
        result
    }

    /// Record that `branch` was (or no longer is) published.
    pub fn set_tracks_remote(&mut self, branch: &str, tracks: bool) {
        self.lineage.record_mut(branch).tracks_remote = tracks;
    }

    /// Insert a fresh record for a newly created branch.
    pub fn insert(&mut self, branch: &str, record: BranchRecord) {
        self.lineage.insert(branch, record);
    }

    /// Drop the record of `branch`. Children keep pointing at it.
    pub fn remove(&mut self, branch: &str) -> Option<BranchRecord> {
        let removed = self.lineage.remove(branch);
        let orphans = self.children_of(branch);
        if !orphans.is_empty() {
            tracing::warn!(branch, ?orphans, "Removed branch still has children");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hierarchy() -> Hierarchy {
        Hierarchy::new(Lineage::new(), BranchRoles::new("main").with_perennials(["release"]))
    }

    #[test]
    fn chain_of_child_reaches_main() {
        let mut h = hierarchy();
        h.set_parent("feature-a", "main").unwrap();
        h.set_parent("child", "feature-a").unwrap();

        assert_eq!(h.ancestor_chain("child").unwrap(), vec!["feature-a", "main"]);
        assert_eq!(h.ancestor_chain("feature-a").unwrap(), vec!["main"]);
        assert!(h.ancestor_chain("main").unwrap().is_empty());
    }

    #[test]
    fn chain_stops_at_perennial() {
        let mut h = hierarchy();
        h.set_parent("hotfix", "release").unwrap();
        assert_eq!(h.ancestor_chain("hotfix").unwrap(), vec!["release"]);
        assert_eq!(h.parent_of("release"), None);
    }

    #[test]
    fn set_parent_to_self_is_cycle() {
        let mut h = hierarchy();
        let err = h.set_parent("a", "a").unwrap_err();
        assert!(matches!(err, Error::CycleDetected { .. }));
    }

    #[test]
    fn set_parent_to_descendant_is_cycle() {
        let mut h = hierarchy();
        h.set_parent("a", "main").unwrap();
        h.set_parent("b", "a").unwrap();
        h.set_parent("c", "b").unwrap();

        let err = h.set_parent("a", "c").unwrap_err();
        assert!(
            matches!(err, Error::CycleDetected { ref branch, ref parent } if branch == "a" && parent == "c")
        );
        // Edge unchanged
        assert_eq!(h.parent_of("a"), Some("main"));
    }

    #[test]
    fn reparenting_replaces_edge() {
        let mut h = hierarchy();
        h.set_parent("a", "main").unwrap();
        h.set_parent("b", "main").unwrap();
        h.set_parent("b", "a").unwrap();

        assert_eq!(h.parent_of("b"), Some("a"));
        assert_eq!(h.children_of("main"), vec!["a"]);
        assert_eq!(h.descendants_of("main"), vec!["a", "b"]);
    }

    #[test]
    fn removed_parent_breaks_child_chain() {
        let mut h = hierarchy();
        h.set_parent("feature-a", "main").unwrap();
        h.set_parent("child", "feature-a").unwrap();
        h.remove("feature-a");

        let err = h.ancestor_chain("child").unwrap_err();
        match err {
            Error::BrokenHierarchy { branch, missing, .. } => {
                assert_eq!(branch, "child");
                assert_eq!(missing, "feature-a");
            }
            other => panic!("expected BrokenHierarchy, got {other}"),
        }
    }

    #[test]
    fn unrecorded_branch_has_broken_chain() {
        let h = hierarchy();
        assert!(matches!(
            h.ancestor_chain("stray").unwrap_err(),
            Error::BrokenHierarchy { .. }
        ));
        assert_eq!(h.parent_of("stray"), None);
    }

    #[test]
    fn perennial_marks_are_orthogonal_to_edges() {
        let mut h = hierarchy();
        h.set_parent("staging", "main").unwrap();
        h.set_parent("qa-fix", "staging").unwrap();

        assert!(h.mark_perennial("staging"));
        assert!(!h.mark_perennial("staging"));
        assert_eq!(h.ancestor_chain("qa-fix").unwrap(), vec!["staging"]);
        assert_eq!(h.parent_of("staging"), None);

        // Recorded parent becomes live again
        assert!(h.unmark_perennial("staging"));
        assert_eq!(h.ancestor_chain("qa-fix").unwrap(), vec!["staging", "main"]);
    }

    #[test]
    fn main_cannot_be_marked_perennial() {
        let mut h = hierarchy();
        assert!(!h.mark_perennial("main"));
        assert!(!h.perennials().contains("main"));
        assert!(h.lineage().perennials().is_empty());
    }

    #[test]
    fn corrupted_loop_is_reported() {
        let mut lineage = Lineage::new();
        lineage.insert("a", BranchRecord::new("b"));
        lineage.insert("b", BranchRecord::new("a"));
        let h = Hierarchy::new(lineage, BranchRoles::default());

        assert!(matches!(
            h.ancestor_chain("a").unwrap_err(),
            Error::CycleDetected { .. }
        ));
    }

    #[test]
    fn perennials_merge_config_and_store() {
        let mut h = hierarchy();
        h.mark_perennial("staging");
        let all: Vec<String> = h.perennials().into_iter().collect();
        assert_eq!(all, vec!["release", "staging"]);
    }
}
