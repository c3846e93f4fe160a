//! End-to-end runs of the update workflow against in-memory collaborators
//!
//! These tests verify:
//! - A single outdated requirement becomes one write and one pull request
//! - Rejected changes never reach the repository
//! - Missing manifests are skipped, present ones are all scanned
//! - Repositories without push access are published through a fork

mod common;

use common::{InMemoryHost, ScriptedIndex, ScriptedReviewer, BOT_ACCOUNT};
use reqbump::domain::RepoOutcome;
use reqbump::orchestrator::{Orchestrator, OrchestratorConfig};
use reqbump::review::{AutoApprove, Reviewer};
use reqbump::update::UpdateJudge;

const REPO: &str = "octo/app";

fn index() -> ScriptedIndex {
    ScriptedIndex::new(&[
        ("requests", "2.31.0"),
        ("flask", "3.0.0"),
        ("django", "5.0.1"),
        ("six", "1.16.0"),
        ("urllib3", "1.26.18"),
    ])
}

fn orchestrator(host: &InMemoryHost, reviewer: Box<dyn Reviewer>) -> Orchestrator {
    orchestrator_with(host, reviewer, OrchestratorConfig::default())
}

fn orchestrator_with(
    host: &InMemoryHost,
    reviewer: Box<dyn Reviewer>,
    config: OrchestratorConfig,
) -> Orchestrator {
    Orchestrator::new(
        Box::new(host.clone()),
        Box::new(index()),
        reviewer,
        UpdateJudge::default(),
        config,
    )
}

fn dry_run() -> OrchestratorConfig {
    OrchestratorConfig {
        dry_run: true,
        ..OrchestratorConfig::default()
    }
}

mod publication {
    use super::*;

    #[tokio::test]
    async fn test_single_update_opens_one_pull_request() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        host.add_file(REPO, "requirements.txt", "requests==2.25.0\n");

        let mut orch = orchestrator(&host, Box::new(AutoApprove));
        let outcome = orch.check_and_update_repo(REPO).await;

        assert_eq!(
            outcome.pull_request_url(),
            Some("https://github.com/octo/app/pull/1")
        );

        let writes = host.writes();
        assert_eq!(writes.len(), 1);
        let (repo, write) = &writes[0];
        assert_eq!(repo, REPO);
        assert_eq!(write.path, "requirements.txt");
        assert_eq!(write.content, "requests==2.31.0\n");
        assert_eq!(write.message, "Update dependencies in requirements.txt");
        assert!(write.branch.starts_with("update-dependencies-"));

        let prs = host.pull_requests();
        assert_eq!(prs.len(), 1);
        let (base_repo, pr) = &prs[0];
        assert_eq!(base_repo, REPO);
        assert_eq!(pr.title, "Update Dependencies");
        assert_eq!(pr.base, "main");
        assert_eq!(pr.head, write.branch);
        assert!(pr.body.contains("`requests==2.25.0` → `requests==2.31.0`"));

        // The default branch is untouched
        assert_eq!(
            host.file(REPO, "main", "requirements.txt").as_deref(),
            Some("requests==2.25.0\n")
        );
    }

    #[tokio::test]
    async fn test_every_manifest_is_written_once() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        host.add_file(
            REPO,
            "requirements.txt",
            "# web\nrequests==2.25.0  # pinned\nflask>=2.0,<3.0\n",
        );
        host.add_file(
            REPO,
            "Pipfile",
            "[packages]\ndjango = \"==4.2\"\nsix = \"*\"\n\n[requires]\npython_version = \"3.11\"\n",
        );
        host.add_file(
            REPO,
            "setup.py",
            "setup(\n    name='app',\n    install_requires=['requests>=2.0', 'six==1.15.0'],\n)\n",
        );

        let mut orch = orchestrator(&host, Box::new(AutoApprove));
        let outcome = orch.check_and_update_repo(REPO).await;
        assert!(outcome.pull_request_url().is_some(), "{:?}", outcome);

        let written: Vec<_> = host.writes().into_iter().map(|(_, w)| w.path).collect();
        assert_eq!(written, vec!["requirements.txt", "setup.py", "Pipfile"]);

        let branch = host.writes()[0].1.branch.clone();
        assert_eq!(
            host.file(REPO, &branch, "requirements.txt").as_deref(),
            Some("# web\nrequests==2.31.0  # pinned\nflask>=3.0.0\n")
        );
        assert_eq!(
            host.file(REPO, &branch, "setup.py").as_deref(),
            Some(concat!(
                "setup(\n    name='app',\n",
                "    install_requires=['requests>=2.0', 'six==1.16.0'],\n)\n"
            ))
        );
        assert_eq!(
            host.file(REPO, &branch, "Pipfile").as_deref(),
            Some(concat!(
                "[packages]\ndjango = \"==5.0.1\"\nsix = \"==1.16.0\"\n\n",
                "[requires]\npython_version = \"3.11\"\n"
            ))
        );
        assert_eq!(host.pull_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_bare_names_rewrite_only_the_requirement() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        host.add_file(
            REPO,
            "requirements.txt",
            "# flask is our web framework\nflask-cors==4.0.0\nflask\n",
        );
        host.add_file(
            REPO,
            "setup.py",
            "setup(\n    name='requests-helper',\n    install_requires=['requests'],\n)\n",
        );

        let mut orch = orchestrator(&host, Box::new(AutoApprove));
        let outcome = orch.check_and_update_repo(REPO).await;
        let branch = host.pull_requests()[0].1.head.clone();
        assert!(outcome.pull_request_url().is_some());

        assert_eq!(
            host.file(REPO, &branch, "requirements.txt").as_deref(),
            Some("# flask is our web framework\nflask-cors==4.0.0\nflask==3.0.0\n")
        );
        assert_eq!(
            host.file(REPO, &branch, "setup.py").as_deref(),
            Some(concat!(
                "setup(\n    name='requests-helper',\n",
                "    install_requires=['requests==2.31.0'],\n)\n"
            ))
        );
    }

    #[tokio::test]
    async fn test_hashed_lock_file_keeps_continuations() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        host.add_file(
            REPO,
            "requirements.lock",
            concat!(
                "requests==2.31.0 \\\n    --hash=sha256:aaa\n",
                "six==1.15.0 \\\n    --hash=sha256:bbb\n",
            ),
        );

        let mut orch = orchestrator(&host, Box::new(AutoApprove));
        let outcome = orch.check_and_update_repo(REPO).await;
        let branch = host.pull_requests()[0].1.head.clone();
        assert!(outcome.pull_request_url().is_some());

        // requests is already current; only six moves
        let writes = host.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(
            host.file(REPO, &branch, "requirements.lock").as_deref(),
            Some(concat!(
                "requests==2.31.0 \\\n    --hash=sha256:aaa\n",
                "six==1.16.0 \\\n    --hash=sha256:bbb\n",
            ))
        );
        assert!(!host.pull_requests()[0].1.body.contains("requests"));
    }

    #[tokio::test]
    async fn test_fork_when_push_is_not_allowed() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, false);
        host.add_file(REPO, "requirements.txt", "requests==2.25.0\n");

        let mut orch = orchestrator(&host, Box::new(AutoApprove));
        let outcome = orch.check_and_update_repo(REPO).await;
        assert!(outcome.pull_request_url().is_some(), "{:?}", outcome);

        assert_eq!(host.forks(), vec!["bot/app"]);

        let writes = host.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "bot/app");

        let prs = host.pull_requests();
        assert_eq!(prs[0].0, REPO);
        assert_eq!(
            prs[0].1.head,
            format!("{}:{}", BOT_ACCOUNT, writes[0].1.branch)
        );
        // Nothing was written to the base repository
        assert!(host
            .branches()
            .iter()
            .all(|(repo, _)| repo == "bot/app"));
    }

    #[tokio::test]
    async fn test_final_content_is_shown_before_publishing() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        host.add_file(REPO, "requirements.txt", "requests==2.25.0\nsix\n");

        let reviewer = ScriptedReviewer::new(&[true], true);
        let shown = reviewer.shown_files();
        let mut orch = orchestrator(&host, Box::new(reviewer));
        orch.check_and_update_repo(REPO).await;

        let shown = shown.lock().unwrap();
        assert_eq!(
            *shown,
            vec![(
                "requirements.txt".to_string(),
                "requests==2.31.0\nsix\n".to_string()
            )]
        );
    }
}

mod review {
    use super::*;

    #[tokio::test]
    async fn test_rejecting_every_change_publishes_nothing() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        host.add_file(REPO, "requirements.txt", "requests==2.25.0\nflask==2.0\n");

        let mut orch = orchestrator(&host, Box::new(ScriptedReviewer::rejecting_all()));
        let outcome = orch.check_and_update_repo(REPO).await;

        assert_eq!(outcome, RepoOutcome::Rejected);
        assert!(host.writes().is_empty());
        assert!(host.branches().is_empty());
        assert!(host.pull_requests().is_empty());
    }

    #[tokio::test]
    async fn test_rejecting_a_file_publishes_nothing() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        host.add_file(REPO, "requirements.txt", "requests==2.25.0\n");

        let mut orch = orchestrator(&host, Box::new(ScriptedReviewer::new(&[true], false)));
        let outcome = orch.check_and_update_repo(REPO).await;

        assert_eq!(outcome, RepoOutcome::Rejected);
        assert!(host.writes().is_empty());
        assert!(host.pull_requests().is_empty());
    }

    #[tokio::test]
    async fn test_partial_approval_keeps_rejected_lines() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        host.add_file(REPO, "requirements.txt", "requests==2.25.0\nflask==2.0\n");

        let mut orch = orchestrator(&host, Box::new(ScriptedReviewer::new(&[false, true], true)));
        orch.check_and_update_repo(REPO).await;

        let writes = host.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1.content, "requests==2.25.0\nflask==3.0.0\n");
        let body = &host.pull_requests()[0].1.body;
        assert!(body.contains("flask==3.0.0"));
        assert!(!body.contains("requests==2.31.0"));
    }
}

mod discovery {
    use super::*;

    #[tokio::test]
    async fn test_missing_manifests_have_no_entry() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        host.add_file(REPO, "setup.py", "setup(install_requires=['flask==2.0'])\n");
        host.add_file(REPO, "README.md", "requests==1.0\n");

        let mut orch = orchestrator_with(&host, Box::new(AutoApprove), dry_run());
        match orch.check_and_update_repo(REPO).await {
            RepoOutcome::DryRun { updates } => {
                assert_eq!(updates.paths().collect::<Vec<_>>(), vec!["setup.py"]);
                assert!(!updates.contains("requirements.txt"));
                assert!(!updates.contains("Pipfile"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(host.writes().is_empty());
        assert!(host.branches().is_empty());
    }

    #[tokio::test]
    async fn test_compatible_release_stays_in_series() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        // flask 3.0.0 leaves the 2.0 series; urllib3 1.26.18 stays in 1.26
        host.add_file(REPO, "requirements.txt", "flask~=2.0\nurllib3~=1.26.5\n");

        let mut orch = orchestrator_with(&host, Box::new(AutoApprove), dry_run());
        match orch.check_and_update_repo(REPO).await {
            RepoOutcome::DryRun { updates } => {
                let file = updates.get("requirements.txt").unwrap();
                assert_eq!(file.len(), 1);
                assert_eq!(file[0].old, "urllib3~=1.26.5");
                assert_eq!(file[0].new, "urllib3~=1.26.18");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unlookupable_lines_are_left_alone() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        host.add_file(
            REPO,
            "requirements.txt",
            "-r base.txt\n--index-url https://example.org/simple\nleftpad==0.1\ngit+https://github.com/octo/lib.git#egg=lib\nrequests>=2.0\n",
        );

        let mut orch = orchestrator(&host, Box::new(AutoApprove));
        assert_eq!(
            orch.check_and_update_repo(REPO).await,
            RepoOutcome::NoUpdates
        );
    }

    #[tokio::test]
    async fn test_scan_imports() {
        let host = InMemoryHost::new();
        host.add_repo(REPO, true);
        host.add_file(REPO, "app.py", "import flask\nimport os\nfrom requests import get\n");
        host.add_file(REPO, "requirements.txt", "import nothing\n");

        let config = OrchestratorConfig {
            scan_imports: true,
            ..OrchestratorConfig::default()
        };
        let mut orch = orchestrator_with(&host, Box::new(AutoApprove), config);
        assert_eq!(
            orch.check_and_update_repo(REPO).await,
            RepoOutcome::Imports {
                modules: vec!["flask".to_string(), "requests".to_string()]
            }
        );
    }
}

mod batch {
    use super::*;

    #[tokio::test]
    async fn test_failures_do_not_stop_the_batch() {
        let host = InMemoryHost::new();
        host.add_repo("octo/lib", true);
        host.add_file("octo/lib", "requirements.txt", "requests==2.25.0\n");

        let mut orch = orchestrator(&host, Box::new(AutoApprove));
        let report = orch
            .run(&["octo/missing".to_string(), "octo/lib".to_string()])
            .await;

        assert_eq!(report.repositories.len(), 2);
        assert!(report.repositories[0].outcome.is_failure());
        assert_eq!(report.pull_request_count(), 1);
        assert_eq!(report.failure_count(), 1);
    }

    #[tokio::test]
    async fn test_each_repository_gets_its_own_pull_request() {
        let host = InMemoryHost::new();
        for repo in ["octo/a", "octo/b"] {
            host.add_repo(repo, true);
            host.add_file(repo, "requirements.lock", "django==4.2\n");
        }

        let mut orch = orchestrator(&host, Box::new(AutoApprove));
        let report = orch.run(&["octo/a".to_string(), "octo/b".to_string()]).await;

        assert_eq!(report.pull_request_count(), 2);
        let prs: Vec<_> = host.pull_requests().into_iter().map(|(r, _)| r).collect();
        assert_eq!(prs, vec!["octo/a", "octo/b"]);
    }
}
