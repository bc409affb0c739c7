//! Branch command implementations

use std::path::Path;

use colored::Colorize;

use lineage_core::{BranchLifecycle, CreateOptions, DeleteScope};

use super::open;
use crate::error::Result;

/// Run the branch create command.
pub fn run_branch_create(
    path: &Path,
    name: &str,
    parent: Option<&str>,
    start_point: Option<&str>,
    push: bool,
    checkout: bool,
) -> Result<()> {
    let ctx = open(path)?;
    let parent = parent.unwrap_or(ctx.main_branch()).to_string();

    println!(
        "{} Creating branch {} (parent {})...",
        "=>".blue().bold(),
        name.cyan(),
        parent.yellow()
    );

    let options = CreateOptions {
        parent: Some(parent),
        start_point: start_point.map(str::to_string),
        push,
        checkout,
    };
    BranchLifecycle::new(&ctx).create_branch(name, options)?;

    if push {
        println!(
            "{} Branch {} created and pushed to {}.",
            "OK".green().bold(),
            name.cyan(),
            ctx.remote().yellow()
        );
    } else {
        println!("{} Branch {} created.", "OK".green().bold(), name.cyan());
    }
    Ok(())
}

/// Run the branch delete command.
pub fn run_branch_delete(path: &Path, name: &str, scope: DeleteScope) -> Result<()> {
    let ctx = open(path)?;
    let hierarchy = ctx.load_hierarchy()?;
    let children = hierarchy.children_of(name);

    println!("{} Deleting branch {}...", "=>".blue().bold(), name.cyan());

    BranchLifecycle::new(&ctx).delete_branch(name, scope)?;

    let location = match scope {
        DeleteScope::Local => "locally",
        DeleteScope::Remote => "on the remote",
        DeleteScope::Both => "locally and on the remote",
    };
    println!("{} Branch {} deleted {location}.", "OK".green().bold(), name.cyan());

    if scope.includes_local() && !children.is_empty() {
        println!(
            "{} {} still name {} as parent; use {} to re-parent them.",
            "!!".yellow().bold(),
            children.join(", ").cyan(),
            name.cyan(),
            "lineage parent set".cyan()
        );
    }
    Ok(())
}

/// Run the branch checkout command.
pub fn run_branch_checkout(path: &Path, name: &str) -> Result<()> {
    let ctx = open(path)?;
    BranchLifecycle::new(&ctx).checkout(name)?;
    println!("{} Switched to {}.", "OK".green().bold(), name.cyan());
    Ok(())
}

/// Run the branch list command.
///
/// Lists local branches with markers for the current branch and roots.
pub fn run_branch_list(path: &Path) -> Result<()> {
    let ctx = open(path)?;
    let hierarchy = ctx.load_hierarchy()?;
    let current = ctx.inspector().current_branch().ok();
    let branches = ctx.inspector().local_branches()?;

    if branches.is_empty() {
        println!("{} No branches found.", "=>".blue().bold());
        return Ok(());
    }

    println!("{} Branches:", "=>".blue().bold());

    for branch in &branches {
        let is_current = current.as_deref() == Some(branch.as_str());
        let mut line = String::new();

        if is_current {
            line.push_str(&format!("  {} ", "*".green()));
        } else {
            line.push_str("    ");
        }

        let name_display = if is_current {
            branch.green().bold().to_string()
        } else if hierarchy.is_root(branch) {
            branch.cyan().to_string()
        } else {
            branch.clone()
        };
        line.push_str(&name_display);

        if branch == hierarchy.main() {
            line.push_str(&format!(" {}", "(main)".dimmed()));
        } else if hierarchy.is_perennial(branch) {
            line.push_str(&format!(" {}", "(perennial)".dimmed()));
        } else if let Some(parent) = hierarchy.parent_of(branch) {
            line.push_str(&format!(" {}", format!("<- {parent}").dimmed()));
        } else {
            line.push_str(&format!(" {}", "(no parent)".yellow()));
        }

        println!("{line}");
    }

    Ok(())
}
