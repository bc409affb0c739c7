//! Core layer for lineage
//!
//! This crate keeps track of which branch was cut from which and answers
//! whether branches are in sync:
//!
//! - **Hierarchy store**: parent edges and perennial marks persisted in the
//!   git directory ([`Lineage`], [`Hierarchy`])
//! - **Configuration resolution**: main branch, perennials and remote
//!   ([`ConfigResolver`])
//! - **SyncEngine**: status of branches against their remote or their parent
//! - **BranchLifecycle**: create, delete, checkout, sync and undo syncs while
//!   keeping the hierarchy consistent
//!
//! # Architecture
//!
//! ```text
//!                 lineage-cli
//!                      |
//!                lineage-core
//!      (RepoContext, SyncEngine, BranchLifecycle)
//!                      |
//!                 lineage-git
//!        (RefInspector, RepoCommands)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use lineage_core::{BranchLifecycle, CreateOptions, Reference, RepoContext, SyncEngine};
//!
//! fn example() -> lineage_core::Result<()> {
//!     let ctx = RepoContext::open(".")?;
//!     BranchLifecycle::new(&ctx).create_branch("feature", CreateOptions::default())?;
//!     let behind = SyncEngine::new(&ctx).count_out_of_sync(Reference::Parent)?;
//!     println!("{behind} branches need a sync");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod lineage;
pub mod sync;

pub use config::{BranchRoles, ConfigResolver, Manifest, ResolvedConfig, SyncStrategy};
pub use context::RepoContext;
pub use error::{Error, Result};
pub use lifecycle::{BranchLifecycle, CreateOptions, DeleteScope, SyncReport, SyncSnapshot};
pub use lineage::{BranchRecord, Hierarchy, LINEAGE_FILE, Lineage};
pub use sync::{BranchStatus, Reference, StatusReport, SyncEngine, SyncStatus};
