//! Parent command implementations

use std::path::Path;

use colored::Colorize;

use lineage_core::{BranchLifecycle, SyncEngine};

use super::{branch_or_current, open};
use crate::error::Result;

/// Run the parent set command.
pub fn run_parent_set(path: &Path, branch: &str, parent: &str) -> Result<()> {
    let ctx = open(path)?;
    BranchLifecycle::new(&ctx).set_parent(branch, parent)?;
    println!(
        "{} {} is now a child of {}.",
        "OK".green().bold(),
        branch.cyan(),
        parent.cyan()
    );
    Ok(())
}

/// Run the parent show command: the ancestor chain, nearest first.
pub fn run_parent_show(path: &Path, branch: Option<&str>) -> Result<()> {
    let ctx = open(path)?;
    let branch = branch_or_current(&ctx, branch)?;
    let chain = SyncEngine::new(&ctx).ancestor_chain(&branch)?;

    if chain.is_empty() {
        println!("{} {} is a root branch.", "=>".blue().bold(), branch.cyan());
        return Ok(());
    }

    let rendered: Vec<String> = std::iter::once(branch.cyan().to_string())
        .chain(chain.iter().map(|name| name.to_string()))
        .collect();
    println!("{}", rendered.join(" <- "));
    Ok(())
}
