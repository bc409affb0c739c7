//! Read-only queries against a repository
//!
//! Every query reopens the repository so that changes made by other actors
//! (pushes, out-of-band branch deletion, new commits) are always observed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use git2::{BranchType, ErrorCode, Oid, Repository};

use crate::{Error, Result};

/// Commit counts between two refs.
///
/// `ahead` counts commits reachable from the first ref but not the second,
/// `behind` the reverse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Divergence {
    pub ahead: usize,
    pub behind: usize,
}

impl Divergence {
    pub fn new(ahead: usize, behind: usize) -> Self {
        Self { ahead, behind }
    }

    /// Both refs have identical history.
    pub fn is_identical(&self) -> bool {
        self.ahead == 0 && self.behind == 0
    }
}

/// Snapshot of one branch name across local and remote-tracking refs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub is_local: bool,
    pub is_remote: bool,
    /// Tip of the local ref, falling back to the remote-tracking ref
    pub tip: Option<Oid>,
}

/// Stateless query interface over one working copy.
#[derive(Debug, Clone)]
pub struct RefInspector {
    root: PathBuf,
}

impl RefInspector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Inspector for the working copy containing `path` (searching parent
    /// directories, like git does).
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => Error::NotARepository {
                path: path.to_path_buf(),
            },
            _ => Error::Git(e),
        })?;
        let root = repo
            .workdir()
            .ok_or_else(|| Error::NotARepository {
                path: path.to_path_buf(),
            })?
            .to_path_buf();
        Ok(Self::new(root))
    }

    /// Path the inspector was created for.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open the repository fresh for a single query.
    pub fn open(&self) -> Result<Repository> {
        Repository::open(&self.root).map_err(|e| match e.code() {
            ErrorCode::NotFound => Error::NotARepository {
                path: self.root.clone(),
            },
            _ => Error::Git(e),
        })
    }

    /// Path of the git directory (`.git`) of this working copy.
    pub fn git_dir(&self) -> Result<PathBuf> {
        Ok(self.open()?.path().to_path_buf())
    }

    /// Name of the checked-out branch.
    ///
    /// Works on an unborn branch (fresh repository without commits).
    pub fn current_branch(&self) -> Result<String> {
        let repo = self.open()?;
        match repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().unwrap_or("HEAD").to_string()),
            Ok(_) => Err(Error::DetachedHead),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = repo.find_reference("HEAD")?;
                head.symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .map(str::to_string)
                    .ok_or(Error::DetachedHead)
            }
            Err(e) => Err(Error::Git(e)),
        }
    }

    /// Names of all local branches.
    pub fn local_branches(&self) -> Result<BTreeSet<String>> {
        self.branch_names(BranchType::Local)
    }

    /// Names of all remote-tracking branches, qualified with the remote
    /// (`origin/feature`). Symbolic `origin/HEAD` refs are skipped.
    pub fn remote_branches(&self) -> Result<BTreeSet<String>> {
        let names = self.branch_names(BranchType::Remote)?;
        Ok(names
            .into_iter()
            .filter(|name| !name.ends_with("/HEAD"))
            .collect())
    }

    fn branch_names(&self, kind: BranchType) -> Result<BTreeSet<String>> {
        let repo = self.open()?;
        let mut names = BTreeSet::new();
        for entry in repo.branches(Some(kind))? {
            let (branch, _) = entry?;
            if let Some(name) = branch.name()? {
                names.insert(name.to_string());
            }
        }
        Ok(names)
    }

    /// Configured remotes.
    pub fn remotes(&self) -> Result<Vec<String>> {
        let repo = self.open()?;
        let remotes = repo.remotes()?;
        Ok(remotes.iter().flatten().map(str::to_string).collect())
    }

    /// Whether a local branch with this name exists.
    pub fn has_local_branch(&self, name: &str) -> Result<bool> {
        let repo = self.open()?;
        Ok(repo.find_branch(name, BranchType::Local).is_ok())
    }

    /// Whether `remote/name` exists as a remote-tracking branch.
    pub fn has_remote_branch(&self, remote: &str, name: &str) -> Result<bool> {
        let repo = self.open()?;
        Ok(repo
            .find_branch(&format!("{remote}/{name}"), BranchType::Remote)
            .is_ok())
    }

    /// Upstream configured for a local branch (`origin/feature`), read from
    /// git config. The upstream ref itself may no longer exist.
    pub fn upstream_of(&self, name: &str) -> Result<Option<String>> {
        let repo = self.open()?;
        match repo.branch_upstream_name(&format!("refs/heads/{name}")) {
            Ok(buf) => Ok(buf
                .as_str()
                .map(|s| s.trim_start_matches("refs/remotes/").to_string())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(Error::Git(e)),
        }
    }

    /// Commit a branch or ref points at.
    ///
    /// Resolution order: local branch, remote-tracking branch, any revspec.
    pub fn commit_at(&self, name: &str) -> Result<Oid> {
        let repo = self.open()?;
        resolve_commit(&repo, name)
    }

    /// Commits in `a` not in `b`, and in `b` not in `a`.
    pub fn divergence(&self, a: &str, b: &str) -> Result<Divergence> {
        let repo = self.open()?;
        let oid_a = resolve_commit(&repo, a)?;
        let oid_b = resolve_commit(&repo, b)?;
        let (ahead, behind) = repo.graph_ahead_behind(oid_a, oid_b)?;
        tracing::debug!(a, b, ahead, behind, "divergence");
        Ok(Divergence::new(ahead, behind))
    }

    /// Whether `candidate` is reachable from `descendant`.
    ///
    /// A commit counts as its own ancestor.
    pub fn is_ancestor(&self, candidate: &str, descendant: &str) -> Result<bool> {
        let repo = self.open()?;
        let ancestor = resolve_commit(&repo, candidate)?;
        let tip = resolve_commit(&repo, descendant)?;
        if ancestor == tip {
            return Ok(true);
        }
        Ok(repo.graph_descendant_of(tip, ancestor)?)
    }

    /// Existence and tip of `name` locally and on `remote`.
    pub fn branch(&self, name: &str, remote: &str) -> Result<Branch> {
        let repo = self.open()?;
        let local = repo.find_branch(name, BranchType::Local).ok();
        let tracking = repo
            .find_branch(&format!("{remote}/{name}"), BranchType::Remote)
            .ok();

        let tip = match (&local, &tracking) {
            (Some(b), _) | (None, Some(b)) => Some(b.get().peel_to_commit()?.id()),
            (None, None) => None,
        };

        Ok(Branch {
            name: name.to_string(),
            is_local: local.is_some(),
            is_remote: tracking.is_some(),
            tip,
        })
    }
}

fn resolve_commit(repo: &Repository, name: &str) -> Result<Oid> {
    if let Ok(branch) = repo.find_branch(name, BranchType::Local) {
        return Ok(branch.get().peel_to_commit()?.id());
    }
    if let Ok(branch) = repo.find_branch(name, BranchType::Remote) {
        return Ok(branch.get().peel_to_commit()?.id());
    }
    repo.revparse_single(name)
        .and_then(|object| object.peel_to_commit())
        .map(|commit| commit.id())
        .map_err(|_| Error::UnknownRef {
            name: name.to_string(),
        })
}
