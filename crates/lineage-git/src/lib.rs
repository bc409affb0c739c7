//! Git access layer for lineage
//!
//! Reads go through [`RefInspector`] (git2, reopened per query); writes go
//! through [`RepoCommands`] on top of the [`CommandRunner`] primitive.

pub mod commands;
pub mod error;
pub mod inspector;
pub mod runner;

pub use commands::RepoCommands;
pub use error::{Error, Result};
pub use git2::Oid;
pub use inspector::{Branch, Divergence, RefInspector};
pub use runner::{CommandOutput, CommandRunner, GitCli};
