//! Multi-actor scenarios
//!
//! Each test drives several independent clones of one origin. An actor only
//! observes another actor's work after it was pushed and fetched.

use std::path::Path;

use lineage_core::{
    BranchLifecycle, CreateOptions, DeleteScope, Error, Reference, RepoContext, ResolvedConfig,
    SyncEngine, SyncStatus,
};
use lineage_test_utils::git::{commit_sha, create_commit, create_commits, git};
use lineage_test_utils::{Actor, Scenario};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn context(dir: &Path) -> RepoContext {
    RepoContext::with_config(dir, ResolvedConfig::default()).unwrap()
}

fn create_feature(dir: &Path, name: &str, parent: &str, publish: bool) {
    let ctx = context(dir);
    let mut options = CreateOptions::default().with_parent(parent);
    options.push = publish;
    BranchLifecycle::new(&ctx).create_branch(name, options).unwrap();
}

/// Local and remote-tracking branch names, the way `git branch -a` lists them.
fn existing_branches(ctx: &RepoContext) -> Vec<String> {
    let inspector = ctx.inspector();
    let mut names: Vec<String> = inspector.local_branches().unwrap().into_iter().collect();
    names.extend(inspector.remote_branches().unwrap());
    names
}

#[test]
fn test_remote_deleted_by_coworker_then_removed_locally() {
    let scenario = Scenario::new();
    scenario.in_repository(Actor::Developer, |dir| {
        create_feature(dir, "feature", "main", true);
    });

    scenario.in_repository(Actor::Coworker, |dir| {
        git(dir, &["fetch", "origin"]);
        git(dir, &["push", "origin", ":feature"]);
    });

    scenario.in_repository(Actor::Developer, |dir| {
        let ctx = context(dir);
        ctx.commands().fetch(ctx.remote()).unwrap();

        let engine = SyncEngine::new(&ctx);
        assert_eq!(
            engine.status_of("feature", Reference::Remote).unwrap(),
            SyncStatus::RemoteGone
        );

        BranchLifecycle::new(&ctx)
            .delete_branch("feature", DeleteScope::Both)
            .unwrap();

        // There is no "feature" branch
        assert_eq!(existing_branches(&ctx), vec!["main", "origin/main"]);
        assert_eq!(engine.count_out_of_sync(Reference::Remote).unwrap(), 0);
    });
}

#[test]
fn test_removing_parent_from_machine_breaks_child() {
    let scenario = Scenario::new();
    scenario.in_repository(Actor::Developer, |dir| {
        create_feature(dir, "feature-a", "main", true);
        create_feature(dir, "child", "feature-a", true);

        // Removed behind lineage's back
        git(dir, &["branch", "-D", "feature-a"]);

        let ctx = context(dir);
        let engine = SyncEngine::new(&ctx);
        match engine.status_of("child", Reference::Parent).unwrap_err() {
            Error::BrokenHierarchy {
                branch, missing, ..
            } => {
                assert_eq!(branch, "child");
                assert_eq!(missing, "feature-a");
            }
            other => panic!("expected BrokenHierarchy, got {other}"),
        }

        // The remote view is unaffected
        assert_eq!(
            engine.status_of("child", Reference::Remote).unwrap(),
            SyncStatus::InSync
        );

        // Re-parenting repairs the chain
        BranchLifecycle::new(&ctx).set_parent("child", "main").unwrap();
        assert_eq!(engine.ancestor_chain("child").unwrap(), vec!["main"]);
    });
}

#[test]
fn test_branch_on_another_machine_is_remote_only() {
    let scenario = Scenario::new();
    scenario.in_repository(Actor::DeveloperSecondary, |dir| {
        create_feature(dir, "feature", "main", true);
    });

    scenario.in_repository(Actor::Developer, |dir| {
        let ctx = context(dir);
        ctx.commands().fetch("origin").unwrap();

        assert!(!ctx.inspector().has_local_branch("feature").unwrap());
        assert!(ctx.inspector().remote_branches().unwrap().contains("origin/feature"));
        assert!(matches!(
            SyncEngine::new(&ctx).status_of("feature", Reference::Remote),
            Err(Error::Git(lineage_git::Error::UnknownBranch { .. }))
        ));
        // Lineage records are per clone
        assert!(ctx.load_hierarchy().unwrap().record("feature").is_none());
    });
}

#[test]
fn test_local_branch_is_never_pushed() {
    let scenario = Scenario::new();
    scenario.in_repository(Actor::Developer, |dir| {
        create_feature(dir, "feature", "main", false);
        create_commits(dir, "feature");

        let ctx = context(dir);
        assert_eq!(
            SyncEngine::new(&ctx)
                .status_of("feature", Reference::Remote)
                .unwrap(),
            SyncStatus::LocalOnly
        );
        BranchLifecycle::new(&ctx).sync_branch("feature").unwrap();
    });

    assert_eq!(scenario.origin_branches(), vec!["main"]);
}

#[rstest]
#[case::behind("main", SyncStatus::Behind)]
#[case::ahead("feature", SyncStatus::Ahead)]
fn test_feature_relative_to_main(#[case] commit_to: &str, #[case] expected: SyncStatus) {
    let scenario = Scenario::new();
    scenario.in_repository(Actor::Developer, |dir| {
        create_feature(dir, "feature", "main", true);
        create_commits(dir, commit_to);

        let ctx = context(dir);
        let engine = SyncEngine::new(&ctx);
        assert_eq!(engine.status_of("feature", Reference::Parent).unwrap(), expected);
        assert_eq!(engine.count_out_of_sync(Reference::Parent).unwrap(), 1);
    });
}

#[test]
fn test_stale_branch_from_old_commit() {
    let scenario = Scenario::new();
    scenario.in_repository(Actor::Developer, |dir| {
        create_commit(dir, "main", "first.txt", "1", "first main commit");
        create_commit(dir, "main", "second.txt", "2", "second main commit");

        let ctx = context(dir);
        BranchLifecycle::new(&ctx)
            .create_branch(
                "stale",
                CreateOptions::default().with_start_point(commit_sha(dir, "first main commit")),
            )
            .unwrap();

        let engine = SyncEngine::new(&ctx);
        assert_eq!(
            engine.status_of("stale", Reference::Parent).unwrap(),
            SyncStatus::Behind
        );
        assert!(ctx.inspector().is_ancestor("stale", "main").unwrap());
    });
}

#[test]
fn test_perennial_behind_main_is_not_counted() {
    let scenario = Scenario::new();
    scenario.in_repository(Actor::Developer, |dir| {
        let ctx = context(dir);
        let lifecycle = BranchLifecycle::new(&ctx);
        lifecycle
            .create_branch("qa", CreateOptions::default())
            .unwrap();
        lifecycle.mark_perennial("qa").unwrap();
        create_commits(dir, "main");

        let engine = SyncEngine::new(&ctx);
        assert_eq!(engine.count_out_of_sync(Reference::Parent).unwrap(), 0);
        assert_eq!(
            engine.status_of("qa", Reference::Parent).unwrap(),
            SyncStatus::InSync
        );

        let report = engine.report(Reference::Parent).unwrap();
        let qa = report.branch("qa").unwrap();
        assert!(qa.root);
        assert_eq!(qa.parent, None);
    });
}

#[test]
fn test_all_branches_synchronized_across_actors() {
    let scenario = Scenario::new();
    scenario.in_repository(Actor::Developer, |dir| {
        create_feature(dir, "feature-a", "main", true);
        create_feature(dir, "child", "feature-a", true);
    });

    scenario.in_repository(Actor::Coworker, |dir| {
        git(dir, &["fetch", "origin"]);
        git(dir, &["checkout", "-b", "feature-a", "origin/feature-a"]);
        create_commits(dir, "feature-a");
        git(dir, &["push", "origin", "feature-a"]);
        git(dir, &["checkout", "main"]);
        create_commits(dir, "main");
        git(dir, &["push", "origin", "main"]);
    });

    scenario.in_repository(Actor::Developer, |dir| {
        let ctx = context(dir);
        ctx.commands().fetch("origin").unwrap();
        let engine = SyncEngine::new(&ctx);
        assert_eq!(engine.count_out_of_sync(Reference::Remote).unwrap(), 1);
        assert_eq!(engine.count_out_of_sync(Reference::Parent).unwrap(), 0);

        let report = BranchLifecycle::new(&ctx).sync_all().unwrap();
        assert!(report.skipped.is_empty());
        assert!(
            report
                .actions
                .contains(&"merged origin/feature-a into feature-a".to_string())
        );

        // All branches are now synchronized
        assert_eq!(engine.count_out_of_sync(Reference::Remote).unwrap(), 0);
        // feature-a carries the coworker's commit and a merge on top of main
        assert_eq!(
            engine.status_of("feature-a", Reference::Parent).unwrap(),
            SyncStatus::Ahead
        );
        assert_eq!(
            engine.status_of("child", Reference::Parent).unwrap(),
            SyncStatus::InSync
        );
        assert_eq!(
            engine.status_of("main", Reference::Remote).unwrap(),
            SyncStatus::InSync
        );
    });

    // The coworker sees the developer's merges after fetching
    scenario.in_repository(Actor::Coworker, |dir| {
        let ctx = context(dir);
        ctx.commands().fetch("origin").unwrap();
        assert_eq!(
            SyncEngine::new(&ctx)
                .status_of("feature-a", Reference::Remote)
                .unwrap(),
            SyncStatus::Behind
        );
    });
}

#[test]
fn test_there_are_no_more_feature_branches() {
    let scenario = Scenario::new();
    scenario.in_repository(Actor::Developer, |dir| {
        create_feature(dir, "feature-a", "main", true);
        create_feature(dir, "feature-b", "main", true);
        create_feature(dir, "local-only", "main", false);

        let ctx = context(dir);
        let lifecycle = BranchLifecycle::new(&ctx);
        git(dir, &["checkout", "feature-b"]);
        for name in ["feature-a", "feature-b", "local-only"] {
            lifecycle.delete_branch(name, DeleteScope::Both).unwrap();
        }

        assert_eq!(existing_branches(&ctx), vec!["main", "origin/main"]);
        assert_eq!(ctx.inspector().current_branch().unwrap(), "main");
        assert_eq!(ctx.load_hierarchy().unwrap().lineage().records().count(), 0);
    });
    assert_eq!(scenario.origin_branches(), vec!["main"]);
}
