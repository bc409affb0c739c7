//! Git repository fixtures and command helpers.
//!
//! All helpers shell out to the `git` CLI and panic on failure, so test
//! setup errors surface at the line that caused them.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Run `git` with `args` in `dir` and return trimmed stdout.
///
/// # Panics
/// Panics if git cannot be spawned or exits non-zero.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`git {args:?}` failed in {}:\n{}",
            dir.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Configure a minimal identity so commits inside tests never fail.
pub fn configure_identity(dir: &Path, name: &str) {
    git(dir, &["config", "user.email", &format!("{name}@example.com")]);
    git(dir, &["config", "user.name", name]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// Initialises a real git repository using `git2` (no initial commit, no config).
///
/// Realism level: **REAL**: valid git object store, unborn `main` branch.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    let repo = git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    });
    repo.set_head("refs/heads/main")
        .unwrap_or_else(|e| panic!("real_git_repo: failed to point HEAD at main: {e}"));
    repo
}

/// Initialises a real git repository with an initial commit on `main`.
///
/// Realism level: **REAL WITH HISTORY**: valid git state, `main` branch, one
/// commit in history. The unborn HEAD is pointed at `main` before the first
/// commit, so the result does not depend on `init.defaultBranch`.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    git(path, &["init"]);
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    configure_identity(path, "test");

    fs::write(path.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);
}

/// Commit a file on `branch`, then return to the previously checked-out
/// branch.
pub fn create_commit(dir: &Path, branch: &str, file: &str, content: &str, message: &str) {
    let previous = git(dir, &["rev-parse", "--abbrev-ref", "HEAD"]);
    if previous != branch {
        git(dir, &["checkout", branch, "--"]);
    }

    fs::write(dir.join(file), content)
        .unwrap_or_else(|e| panic!("create_commit: failed to write {file}: {e}"));
    git(dir, &["add", file]);
    git(dir, &["commit", "-m", message]);

    if previous != branch {
        git(dir, &["checkout", &previous, "--"]);
    }
}

/// Create one commit on `branch` with a generated file name.
pub fn create_commits(dir: &Path, branch: &str) {
    let count = git(dir, &["rev-list", "--count", "--all"]);
    let file = format!("{}_{count}.txt", branch.replace('/', "_"));
    create_commit(dir, branch, &file, "content", &format!("{branch} commit {count}"));
}

/// Full SHA of the first commit whose message matches `message`.
///
/// # Panics
/// Panics if no commit matches.
pub fn commit_sha(dir: &Path, message: &str) -> String {
    let sha = git(
        dir,
        &["log", "--all", "--format=%H", "--fixed-strings", "--grep", message],
    );
    sha.lines()
        .next()
        .filter(|line| !line.is_empty())
        .unwrap_or_else(|| panic!("commit_sha: no commit with message {message:?}"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_repo_with_commit_is_on_main() {
        let temp = TempDir::new().unwrap();
        real_git_repo_with_commit(temp.path());
        assert_eq!(git(temp.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
    }

    #[test]
    fn test_create_commit_returns_to_previous_branch() {
        let temp = TempDir::new().unwrap();
        real_git_repo_with_commit(temp.path());
        git(temp.path(), &["branch", "feature"]);

        create_commit(temp.path(), "feature", "f.txt", "hello", "feature work");

        assert_eq!(git(temp.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "main");
        assert_eq!(commit_sha(temp.path(), "feature work").len(), 40);
    }
}
