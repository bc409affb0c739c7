//! Per-branch lineage record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the store knows about one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    /// Logical parent; `None` only for branches that never had one recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Whether the branch was published and is expected to have a remote
    /// counterpart
    #[serde(default)]
    pub tracks_remote: bool,

    /// When the record was created
    pub created: DateTime<Utc>,
}

impl BranchRecord {
    /// Record a branch with `parent`, not yet published.
    pub fn new(parent: impl Into<String>) -> Self {
        Self {
            parent: Some(parent.into()),
            tracks_remote: false,
            created: Utc::now(),
        }
    }

    /// Record a branch without a parent (perennial marks, tracking flags).
    pub fn orphan() -> Self {
        Self {
            parent: None,
            tracks_remote: false,
            created: Utc::now(),
        }
    }
}
