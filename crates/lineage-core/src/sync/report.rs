//! Status report types for rendering

use serde::{Deserialize, Serialize};

use super::status::{Reference, SyncStatus};

/// One row of a status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchStatus {
    pub name: String,
    /// Logical parent; `None` for roots and unrecorded branches
    pub parent: Option<String>,
    /// Main or perennial
    pub root: bool,
    /// `None` when the status could not be determined, see `error`
    pub status: Option<SyncStatus>,
    pub ahead: Option<usize>,
    pub behind: Option<usize>,
    pub error: Option<String>,
}

impl BranchStatus {
    /// Whether this row counts towards the out-of-sync total. Roots never do.
    pub fn is_out_of_sync(&self, reference: Reference) -> bool {
        !self.root
            && self
                .status
                .is_some_and(|status| status.is_out_of_sync(reference))
    }
}

/// Status of every local branch against one reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub reference: Reference,
    /// Checked-out branch, if HEAD is on a branch
    pub current: Option<String>,
    pub branches: Vec<BranchStatus>,
}

impl StatusReport {
    /// Non-root branches out of sync with the reference.
    pub fn out_of_sync(&self) -> usize {
        self.branches
            .iter()
            .filter(|row| row.is_out_of_sync(self.reference))
            .count()
    }

    /// Rows whose status could not be determined.
    pub fn errors(&self) -> impl Iterator<Item = &BranchStatus> {
        self.branches.iter().filter(|row| row.error.is_some())
    }

    /// Row for `name`, if it is a local branch.
    pub fn branch(&self, name: &str) -> Option<&BranchStatus> {
        self.branches.iter().find(|row| row.name == name)
    }
}
