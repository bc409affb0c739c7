//! Tree command: the branch forest, roots first

use std::collections::BTreeSet;
use std::path::Path;

use colored::Colorize;

use lineage_core::Hierarchy;

use super::open;
use crate::error::Result;

/// Run the tree command.
pub fn run_tree(path: &Path) -> Result<()> {
    let ctx = open(path)?;
    let hierarchy = ctx.load_hierarchy()?;
    let local = ctx.inspector().local_branches()?;
    let current = ctx.inspector().current_branch().ok();

    for line in render(&hierarchy, &local, current.as_deref()) {
        println!("{line}");
    }
    Ok(())
}

/// Lines of the tree. Roots come first; local branches that do not hang off
/// a root (unrecorded, or with a deleted parent) are listed last.
fn render(hierarchy: &Hierarchy, local: &BTreeSet<String>, current: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut shown = BTreeSet::new();

    let roots = local.iter().filter(|name| hierarchy.is_root(name));
    for root in roots {
        walk(hierarchy, local, root, 0, current, &mut shown, &mut lines);
    }

    let detached: Vec<&String> = local.iter().filter(|name| !shown.contains(*name)).collect();
    if !detached.is_empty() {
        lines.push(format!("{}", "detached from the hierarchy:".yellow()));
        for name in detached {
            lines.push(format!("  {}", label(name, current)));
        }
    }
    lines
}

fn walk(
    hierarchy: &Hierarchy,
    local: &BTreeSet<String>,
    branch: &str,
    depth: usize,
    current: Option<&str>,
    shown: &mut BTreeSet<String>,
    lines: &mut Vec<String>,
) {
    if !shown.insert(branch.to_string()) {
        return;
    }
    lines.push(format!("{}{}", "  ".repeat(depth), label(branch, current)));
    for child in hierarchy.children_of(branch) {
        // Perennials with a recorded parent are printed as roots of their own
        if local.contains(&child) && !hierarchy.is_root(&child) {
            walk(hierarchy, local, &child, depth + 1, current, shown, lines);
        }
    }
}

fn label(branch: &str, current: Option<&str>) -> String {
    if current == Some(branch) {
        format!("{} {}", branch.green().bold(), "*".green())
    } else {
        branch.to_string()
    }
}
