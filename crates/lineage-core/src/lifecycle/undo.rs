//! Undoing the last sync

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Read;
use std::path::Path;

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::lineage::Lineage;
use crate::{Error, Result};

use super::BranchLifecycle;

/// File name of the sync snapshot inside the git directory
pub const UNDO_FILE: &str = "lineage-undo.toml";

/// State of the clone before a sync run touched it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    /// Branch checked out when the sync started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,

    /// Branches pushed or published during the sync
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pushed: Vec<String>,

    /// Tip of every synced branch before the sync
    #[serde(default)]
    pub tips: BTreeMap<String, String>,

    /// Parent edges and perennial marks before the sync
    #[serde(default)]
    pub lineage: Lineage,
}

impl SyncSnapshot {
    /// Load the snapshot at `path`, if a sync left one.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path)?;
        file.lock_shared()?;
        let mut content = String::new();
        (&file).read_to_string(&mut content)?;
        Ok(Some(toml::from_str(&content)?))
    }

    /// Replace the snapshot at `path`.
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

    /// Drop the snapshot at `path`. A missing file is fine.
    pub fn discard(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

impl BranchLifecycle<'_> {
    /// Undo the last sync that changed anything.
    ///
    /// Every synced branch is reset to its tip from before the sync, the
    /// lineage file is restored, and the branch checked out back then is
    /// checked out again. Commits already pushed stay on the remote; the
    /// returned lines name those branches.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NothingToUndo`] if there is no snapshot.
    pub fn undo_sync(&self) -> Result<Vec<String>> {
        let path = self.ctx.undo_path();
        let snapshot = SyncSnapshot::load(path)?.ok_or(Error::NothingToUndo)?;
        let inspector = self.ctx.inspector();
        let commands = self.ctx.commands();
        let current = inspector.current_branch().ok();
        let mut actions = Vec::new();

        for (branch, tip) in &snapshot.tips {
            if !inspector.has_local_branch(branch)? {
                tracing::warn!(branch = %branch, "Branch no longer exists, not restoring");
                continue;
            }
            if inspector.commit_at(branch)?.to_string() == *tip {
                continue;
            }
            if current.as_deref() == Some(branch.as_str()) {
                commands.reset_hard(tip)?;
            } else {
                commands.reset_branch(branch, tip)?;
            }
            let short = &tip[..tip.len().min(7)];
            tracing::info!(branch = %branch, tip = short, "Restored branch");
            actions.push(format!("reset {branch} to {short}"));
        }

        for branch in &snapshot.pushed {
            actions.push(format!(
                "{}/{branch} still has the pushed commits",
                self.ctx.remote()
            ));
        }

        if let Some(original) = &snapshot.original
            && current.as_ref() != Some(original)
            && inspector.has_local_branch(original)?
        {
            commands.checkout(original)?;
            actions.push(format!("checked out {original}"));
        }

        snapshot.lineage.save(self.ctx.lineage_path())?;
        SyncSnapshot::discard(path)?;
        Ok(actions)
    }
}
