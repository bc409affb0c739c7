//! Perennial branch commands

use std::path::Path;

use colored::Colorize;

use lineage_core::BranchLifecycle;

use super::open;
use crate::error::{CliError, Result};

pub fn run_perennial_add(path: &Path, name: &str) -> Result<()> {
    let ctx = open(path)?;
    if BranchLifecycle::new(&ctx).mark_perennial(name)? {
        println!("{} {} is now perennial.", "OK".green().bold(), name.cyan());
    } else if name == ctx.main_branch() {
        println!("{} {} is the main branch.", "=>".blue().bold(), name.cyan());
    } else {
        println!("{} {} is already perennial.", "=>".blue().bold(), name.cyan());
    }
    Ok(())
}

pub fn run_perennial_remove(path: &Path, name: &str) -> Result<()> {
    let ctx = open(path)?;
    if BranchLifecycle::new(&ctx).unmark_perennial(name)? {
        println!("{} {} is no longer perennial.", "OK".green().bold(), name.cyan());
        return Ok(());
    }

    let hierarchy = ctx.load_hierarchy()?;
    if hierarchy.is_root(name) {
        Err(CliError::user(format!(
            "'{name}' is perennial by configuration; edit .lineage/config.toml instead"
        )))
    } else {
        Err(CliError::user(format!("'{name}' is not perennial")))
    }
}

pub fn run_perennial_list(path: &Path) -> Result<()> {
    let ctx = open(path)?;
    let hierarchy = ctx.load_hierarchy()?;

    println!("{} {} (main)", "=>".blue().bold(), hierarchy.main().cyan());
    for name in hierarchy.perennials() {
        println!("   {}", name.cyan());
    }
    if let Some(pattern) = &ctx.config().perennial_regex {
        println!("   {} {}", "matching".dimmed(), pattern.yellow());
    }
    Ok(())
}
