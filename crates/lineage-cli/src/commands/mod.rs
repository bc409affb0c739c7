//! Command implementations for lineage-cli

pub mod branch;
pub mod config;
pub mod parent;
pub mod perennial;
pub mod status;
pub mod sync;
pub mod tree;

use std::path::Path;

use lineage_core::RepoContext;

use crate::error::Result;

pub use branch::{run_branch_checkout, run_branch_create, run_branch_delete, run_branch_list};
pub use config::{run_config_main, run_config_show};
pub use parent::{run_parent_set, run_parent_show};
pub use perennial::{run_perennial_add, run_perennial_list, run_perennial_remove};
pub use status::run_status;
pub use sync::{run_sync, run_undo};
pub use tree::run_tree;

/// Open the repository containing `path`.
fn open(path: &Path) -> Result<RepoContext> {
    Ok(RepoContext::discover(path)?)
}

/// Branch to operate on: `branch` if given, else the checked-out one.
fn branch_or_current(ctx: &RepoContext, branch: Option<&str>) -> Result<String> {
    match branch {
        Some(name) => Ok(name.to_string()),
        None => Ok(ctx.inspector().current_branch()?),
    }
}
