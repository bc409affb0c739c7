//! Multi-actor repository scenarios.
//!
//! A [`Scenario`] owns a bare `origin` repository and one independent clone
//! per [`Actor`]. Each clone only sees another actor's work after it has been
//! pushed and fetched, exactly like separate machines.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::git::{configure_identity, git, real_git_repo_with_commit};

/// An independent working copy in a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    Developer,
    Coworker,
    DeveloperSecondary,
}

impl Actor {
    pub const ALL: [Actor; 3] = [Actor::Developer, Actor::Coworker, Actor::DeveloperSecondary];

    /// Directory name of this actor's clone.
    pub fn dir_name(self) -> &'static str {
        match self {
            Actor::Developer => "developer",
            Actor::Coworker => "coworker",
            Actor::DeveloperSecondary => "developer_secondary",
        }
    }
}

/// A temporary origin plus one clone per actor.
///
/// # Example
///
/// ```rust,no_run
/// use lineage_test_utils::{Actor, Scenario};
///
/// let scenario = Scenario::new();
/// scenario.in_repository(Actor::Coworker, |dir| {
///     lineage_test_utils::git::git(dir, &["push", "origin", ":feature"]);
/// });
/// ```
pub struct Scenario {
    temp_dir: TempDir,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    /// Create the origin (with `main` and one commit) and clone it for every
    /// actor.
    ///
    /// # Panics
    /// Panics if any git operation fails.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let seed = root.join("seed");
        fs::create_dir(&seed).unwrap();
        real_git_repo_with_commit(&seed);
        git(root, &["clone", "--bare", "seed", "origin.git"]);
        fs::remove_dir_all(&seed).unwrap();

        for actor in Actor::ALL {
            git(root, &["clone", "origin.git", actor.dir_name()]);
            configure_identity(&root.join(actor.dir_name()), actor.dir_name());
        }

        Self { temp_dir }
    }

    /// Path of the bare origin repository.
    pub fn origin(&self) -> PathBuf {
        self.temp_dir.path().join("origin.git")
    }

    /// Working directory of `actor`'s clone.
    pub fn path(&self, actor: Actor) -> PathBuf {
        self.temp_dir.path().join(actor.dir_name())
    }

    /// Run `f` scoped to `actor`'s clone.
    pub fn in_repository<T>(&self, actor: Actor, f: impl FnOnce(&Path) -> T) -> T {
        let dir = self.path(actor);
        f(&dir)
    }

    /// Branch names present in the bare origin.
    pub fn origin_branches(&self) -> Vec<String> {
        git(
            &self.origin(),
            &["for-each-ref", "--format=%(refname:short)", "refs/heads/"],
        )
        .lines()
        .map(str::to_string)
        .collect()
    }
}
