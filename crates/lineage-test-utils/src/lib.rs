//! Shared test utilities for the lineage workspace.
//!
//! This crate provides standardised git fixtures. It is a dev-dependency
//! only and never published.
//!
//! # Modules
//!
//! - [`git`]: single-repository fixtures and git command helpers
//! - [`scenario`]: [`Scenario`] with an origin and independent actor clones

pub mod git;
pub mod scenario;

pub use scenario::{Actor, Scenario};
