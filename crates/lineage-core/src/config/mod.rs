//! Configuration resolution
//!
//! Configuration is loaded and merged from these sources (later sources
//! override earlier):
//!
//! 1. **Global defaults** - `<config_dir>/lineage/config.toml`
//! 2. **Repository config** - `.lineage/config.toml`
//! 3. **Local overrides** - `.lineage/config.local.toml` (git-ignored)
//!
//! ```toml
//! [branches]
//! main = "main"
//! perennials = ["release"]
//! perennial_regex = "^release-"
//!
//! [sync]
//! remote = "origin"
//! push_new_branches = false
//! offline = false
//! feature_strategy = "merge"     # or "rebase"
//! perennial_strategy = "merge"
//! ```

mod manifest;
mod resolver;
mod roles;

pub use manifest::{BranchesSection, Manifest, SyncSection, SyncStrategy};
pub use resolver::{CONFIG_PATH, ConfigResolver, LOCAL_CONFIG_PATH, ResolvedConfig};
pub use roles::BranchRoles;
