//! Hierarchy store
//!
//! The lineage file records the logical parent of every branch created
//! through lineage, which branches were published, and which branches were
//! marked perennial. It lives in the git directory of each clone and is the
//! only persisted state; everything else is re-read from git.

mod hierarchy;
mod record;

pub use hierarchy::Hierarchy;
pub use record::BranchRecord;

use crate::Result;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File, OpenOptions};
use std::path::Path;

/// File name of the lineage store inside the git directory
pub const LINEAGE_FILE: &str = "lineage.toml";

/// Persisted branch hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    /// Format version for forward compatibility
    version: String,

    /// Branches marked perennial in this clone
    #[serde(default)]
    perennial: BTreeSet<String>,

    /// Records keyed by branch name
    #[serde(default)]
    branches: BTreeMap<String, BranchRecord>,
}

impl Default for Lineage {
    fn default() -> Self {
        Self::new()
    }
}

impl Lineage {
    /// Create a new empty lineage
    pub fn new() -> Self {
        Self {
            version: "1.0".to_string(),
            perennial: BTreeSet::new(),
            branches: BTreeMap::new(),
        }
    }

    /// Load a lineage from a TOML file with shared lock
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, locked, or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        file.lock_shared()?;

        // Read through the locked handle to avoid TOCTOU race
        let mut content = String::new();
        use std::io::Read;
        (&file).read_to_string(&mut content)?;
        let lineage: Lineage = toml::from_str(&content)?;

        Ok(lineage)
    }

    /// Load from `path`, or start empty if the file does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(?path, "No lineage file yet, starting empty");
            Ok(Self::new())
        }
    }

    /// Save the lineage atomically with exclusive lock
    ///
    /// Uses write-to-temp-then-rename so that a concurrent reader never sees
    /// a half-written file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or locked.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        lock_file.lock_exclusive()?;

        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Record for `branch`, if any
    pub fn record(&self, branch: &str) -> Option<&BranchRecord> {
        self.branches.get(branch)
    }

    /// Mutable record for `branch`, creating an orphan record if missing
    pub fn record_mut(&mut self, branch: &str) -> &mut BranchRecord {
        self.branches
            .entry(branch.to_string())
            .or_insert_with(BranchRecord::orphan)
    }

    /// Insert or replace the record for `branch`
    pub fn insert(&mut self, branch: impl Into<String>, record: BranchRecord) {
        self.branches.insert(branch.into(), record);
    }

    /// Remove the record for `branch`
    pub fn remove(&mut self, branch: &str) -> Option<BranchRecord> {
        self.branches.remove(branch)
    }

    /// All records in name order
    pub fn records(&self) -> impl Iterator<Item = (&str, &BranchRecord)> {
        self.branches.iter().map(|(name, record)| (name.as_str(), record))
    }

    /// Branches marked perennial in this store
    pub fn perennials(&self) -> &BTreeSet<String> {
        &self.perennial
    }

    pub(crate) fn perennials_mut(&mut self) -> &mut BTreeSet<String> {
        &mut self.perennial
    }
}
