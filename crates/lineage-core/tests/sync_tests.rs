//! Sync Engine tests against real repositories

use std::path::Path;

use lineage_core::{
    BranchLifecycle, CreateOptions, Error, Reference, RepoContext, ResolvedConfig, SyncEngine,
    SyncStatus,
};
use lineage_test_utils::git::{create_commits, git, real_git_repo_with_commit};
use lineage_test_utils::{Actor, Scenario};
use rstest::rstest;
use tempfile::TempDir;

fn context(dir: &Path) -> RepoContext {
    RepoContext::with_config(dir, ResolvedConfig::default()).unwrap()
}

fn local_repo() -> (TempDir, RepoContext) {
    let temp = TempDir::new().unwrap();
    real_git_repo_with_commit(temp.path());
    let ctx = context(temp.path());
    (temp, ctx)
}

fn create(ctx: &RepoContext, name: &str, parent: &str) {
    BranchLifecycle::new(ctx)
        .create_branch(name, CreateOptions::default().with_parent(parent))
        .unwrap();
}

mod parent_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case::untouched(&[], SyncStatus::InSync)]
    #[case::parent_moved(&["main"], SyncStatus::Behind)]
    #[case::feature_moved(&["feature"], SyncStatus::Ahead)]
    #[case::both_moved(&["main", "feature"], SyncStatus::Diverged)]
    fn test_status_against_parent(#[case] commits_on: &[&str], #[case] expected: SyncStatus) {
        let (temp, ctx) = local_repo();
        create(&ctx, "feature", "main");
        for branch in commits_on {
            create_commits(temp.path(), branch);
        }

        let engine = SyncEngine::new(&ctx);
        assert_eq!(engine.status_of("feature", Reference::Parent).unwrap(), expected);
    }

    #[test]
    fn test_root_is_in_sync_with_absent_parent() {
        let (_temp, ctx) = local_repo();
        let engine = SyncEngine::new(&ctx);
        assert_eq!(
            engine.status_of("main", Reference::Parent).unwrap(),
            SyncStatus::InSync
        );
    }

    #[test]
    fn test_nested_branch_compares_against_direct_parent() {
        let (temp, ctx) = local_repo();
        create(&ctx, "feature-a", "main");
        create(&ctx, "child", "feature-a");
        create_commits(temp.path(), "main");

        let engine = SyncEngine::new(&ctx);
        assert_eq!(
            engine.status_of("child", Reference::Parent).unwrap(),
            SyncStatus::InSync
        );
        assert_eq!(
            engine.status_of("feature-a", Reference::Parent).unwrap(),
            SyncStatus::Behind
        );
        assert_eq!(engine.ancestor_chain("child").unwrap(), vec!["feature-a", "main"]);
        assert_eq!(engine.count_out_of_sync(Reference::Parent).unwrap(), 1);
    }

    #[test]
    fn test_parent_deleted_out_of_band_is_broken_hierarchy() {
        let (temp, ctx) = local_repo();
        create(&ctx, "feature-a", "main");
        create(&ctx, "child", "feature-a");
        git(temp.path(), &["branch", "-D", "feature-a"]);

        let engine = SyncEngine::new(&ctx);
        let err = engine.status_of("child", Reference::Parent).unwrap_err();
        match err {
            Error::BrokenHierarchy { branch, missing, .. } => {
                assert_eq!(branch, "child");
                assert_eq!(missing, "feature-a");
            }
            other => panic!("expected BrokenHierarchy, got {other}"),
        }
        assert!(matches!(
            engine.count_out_of_sync(Reference::Parent),
            Err(Error::BrokenHierarchy { .. })
        ));
    }

    #[test]
    fn test_branch_created_outside_lineage_is_broken_hierarchy() {
        let (temp, ctx) = local_repo();
        git(temp.path(), &["branch", "stray"]);

        let err = SyncEngine::new(&ctx)
            .status_of("stray", Reference::Parent)
            .unwrap_err();
        assert!(matches!(err, Error::BrokenHierarchy { ref missing, .. } if missing == "stray"));
    }

    #[test]
    fn test_report_keeps_going_past_broken_rows() {
        let (temp, ctx) = local_repo();
        create(&ctx, "feature-a", "main");
        git(temp.path(), &["branch", "stray"]);
        create_commits(temp.path(), "feature-a");

        let report = SyncEngine::new(&ctx).report(Reference::Parent).unwrap();

        let names: Vec<&str> = report.branches.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["feature-a", "main", "stray"]);
        assert_eq!(report.current.as_deref(), Some("main"));
        assert!(report.branch("main").unwrap().root);

        let feature = report.branch("feature-a").unwrap();
        assert_eq!(feature.status, Some(SyncStatus::Ahead));
        assert_eq!((feature.ahead, feature.behind), (Some(1), Some(0)));
        assert_eq!(feature.parent.as_deref(), Some("main"));

        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.out_of_sync(), 1);
    }
}

mod remote_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unpublished_branch_is_local_only() {
        let (_temp, ctx) = local_repo();
        create(&ctx, "feature", "main");

        let engine = SyncEngine::new(&ctx);
        assert_eq!(
            engine.status_of("feature", Reference::Remote).unwrap(),
            SyncStatus::LocalOnly
        );
        assert_eq!(engine.count_out_of_sync(Reference::Remote).unwrap(), 0);
    }

    #[test]
    fn test_unknown_branch() {
        let (_temp, ctx) = local_repo();
        let err = SyncEngine::new(&ctx)
            .status_of("ghost", Reference::Remote)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Git(lineage_git::Error::UnknownBranch { ref name }) if name == "ghost"
        ));
    }

    #[test]
    fn test_published_branch_tracks_divergence() {
        let scenario = Scenario::new();
        scenario.in_repository(Actor::Developer, |dir| {
            let ctx = context(dir);
            BranchLifecycle::new(&ctx)
                .create_branch("feature", CreateOptions::default().pushed())
                .unwrap();
            let engine = SyncEngine::new(&ctx);
            assert_eq!(
                engine.status_of("feature", Reference::Remote).unwrap(),
                SyncStatus::InSync
            );

            create_commits(dir, "feature");
            assert_eq!(
                engine.status_of("feature", Reference::Remote).unwrap(),
                SyncStatus::Ahead
            );
            assert_eq!(engine.count_out_of_sync(Reference::Remote).unwrap(), 1);
        });
    }

    #[test]
    fn test_coworker_push_makes_branch_behind_then_diverged() {
        let scenario = Scenario::new();
        scenario.in_repository(Actor::Developer, |dir| {
            let ctx = context(dir);
            BranchLifecycle::new(&ctx)
                .create_branch("feature", CreateOptions::default().pushed())
                .unwrap();
        });

        scenario.in_repository(Actor::Coworker, |dir| {
            git(dir, &["fetch", "origin"]);
            git(dir, &["checkout", "-b", "feature", "origin/feature"]);
            create_commits(dir, "feature");
            git(dir, &["push", "origin", "feature"]);
        });

        scenario.in_repository(Actor::Developer, |dir| {
            let ctx = context(dir);
            ctx.commands().fetch("origin").unwrap();
            let engine = SyncEngine::new(&ctx);
            assert_eq!(
                engine.status_of("feature", Reference::Remote).unwrap(),
                SyncStatus::Behind
            );

            create_commits(dir, "feature");
            assert_eq!(
                engine.status_of("feature", Reference::Remote).unwrap(),
                SyncStatus::Diverged
            );
        });
    }

    #[test]
    fn test_remote_deleted_by_coworker_is_remote_gone() {
        let scenario = Scenario::new();
        scenario.in_repository(Actor::Developer, |dir| {
            let ctx = context(dir);
            BranchLifecycle::new(&ctx)
                .create_branch("feature", CreateOptions::default().pushed())
                .unwrap();
        });

        scenario.in_repository(Actor::Coworker, |dir| {
            git(dir, &["fetch", "origin"]);
            git(dir, &["push", "origin", "--delete", "feature"]);
        });

        scenario.in_repository(Actor::Developer, |dir| {
            let ctx = context(dir);
            let engine = SyncEngine::new(&ctx);
            // Not visible until fetched
            assert_eq!(
                engine.status_of("feature", Reference::Remote).unwrap(),
                SyncStatus::InSync
            );

            ctx.commands().fetch("origin").unwrap();
            assert_eq!(
                engine.status_of("feature", Reference::Remote).unwrap(),
                SyncStatus::RemoteGone
            );
            assert_eq!(engine.count_out_of_sync(Reference::Remote).unwrap(), 1);
        });
    }

    #[test]
    fn test_main_follows_origin_main() {
        let scenario = Scenario::new();
        scenario.in_repository(Actor::Coworker, |dir| {
            create_commits(dir, "main");
            git(dir, &["push", "origin", "main"]);
        });

        scenario.in_repository(Actor::Developer, |dir| {
            let ctx = context(dir);
            ctx.commands().fetch("origin").unwrap();
            let engine = SyncEngine::new(&ctx);
            assert_eq!(
                engine.status_of("main", Reference::Remote).unwrap(),
                SyncStatus::Behind
            );
            // Roots are not counted
            assert_eq!(engine.count_out_of_sync(Reference::Remote).unwrap(), 0);
        });
    }
}
