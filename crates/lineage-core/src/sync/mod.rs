//! Sync Engine: branch status against the remote or the logical parent
//!
//! - **status**: [`SyncStatus`] classification and the [`Reference`] compared against
//! - **engine**: [`SyncEngine`] queries (single status, counts, verified chains)
//! - **report**: serializable [`StatusReport`] for rendering

mod engine;
mod report;
mod status;

pub use engine::SyncEngine;
pub use report::{BranchStatus, StatusReport};
pub use status::{Reference, SyncStatus};
