//! Sync command implementation

use std::path::Path;

use colored::Colorize;

use lineage_core::BranchLifecycle;

use super::{branch_or_current, open};
use crate::error::Result;

/// Run the sync command for one branch (and its ancestors) or all branches.
pub fn run_sync(path: &Path, branch: Option<&str>, all: bool) -> Result<()> {
    let ctx = open(path)?;
    let lifecycle = BranchLifecycle::new(&ctx);

    let report = if all {
        println!("{} Syncing all branches...", "=>".blue().bold());
        lifecycle.sync_all()?
    } else {
        let branch = branch_or_current(&ctx, branch)?;
        println!("{} Syncing {}...", "=>".blue().bold(), branch.cyan());
        lifecycle.sync_branch(&branch)?
    };

    for action in &report.actions {
        println!("   {action}");
    }
    for skipped in &report.skipped {
        println!("{} skipped {skipped}", "!!".yellow().bold());
    }

    if report.is_noop() {
        println!("{} Everything up to date.", "OK".green().bold());
    } else {
        println!("{} Sync complete.", "OK".green().bold());
    }
    Ok(())
}

/// Run the undo command: roll back the last sync.
pub fn run_undo(path: &Path) -> Result<()> {
    let ctx = open(path)?;
    let actions = BranchLifecycle::new(&ctx).undo_sync()?;

    for action in &actions {
        println!("   {action}");
    }
    println!("{} Last sync undone.", "OK".green().bold());
    Ok(())
}
