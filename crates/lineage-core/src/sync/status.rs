//! Sync status classification

use std::fmt;

use lineage_git::Divergence;
use serde::{Deserialize, Serialize};

/// How a branch relates to its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    /// Same commits on both sides
    InSync,
    /// Branch has commits the reference lacks
    Ahead,
    /// Reference has commits the branch lacks
    Behind,
    /// Both sides have unique commits
    Diverged,
    /// The branch was published but its remote counterpart is gone
    RemoteGone,
    /// The branch was never published
    LocalOnly,
}

impl SyncStatus {
    /// Classify commit counts between a branch and its reference.
    pub fn from_divergence(divergence: Divergence) -> Self {
        match (divergence.ahead, divergence.behind) {
            (0, 0) => Self::InSync,
            (_, 0) => Self::Ahead,
            (0, _) => Self::Behind,
            _ => Self::Diverged,
        }
    }

    /// Whether this status counts towards the out-of-sync total for
    /// `reference`.
    ///
    /// Against the remote, a branch that was never published is not out of
    /// sync. Against the parent, anything but `InSync` is.
    pub fn is_out_of_sync(self, reference: Reference) -> bool {
        match reference {
            Reference::Remote => matches!(
                self,
                Self::Ahead | Self::Behind | Self::Diverged | Self::RemoteGone
            ),
            Reference::Parent => self != Self::InSync,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InSync => "in-sync",
            Self::Ahead => "ahead",
            Self::Behind => "behind",
            Self::Diverged => "diverged",
            Self::RemoteGone => "remote-gone",
            Self::LocalOnly => "local-only",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a branch is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Reference {
    /// The remote-tracking counterpart on the configured remote
    Remote,
    /// The logical parent from the hierarchy
    Parent,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => f.write_str("remote"),
            Self::Parent => f.write_str("parent"),
        }
    }
}
