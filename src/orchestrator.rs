//! Update orchestrator for coordinating the entire update workflow
//!
//! Per repository, strictly in order:
//! discover manifests → parse → look up latest versions → decide updates →
//! review each change → review each file's final content → branch or fork →
//! write files → (optional test script) → open pull request.
//!
//! Lookup and single-file read failures skip that package or file. Anything
//! else ends the repository's run, and the batch moves on to the next one.

use crate::domain::{FileUpdateSet, ManifestKind, RepoOutcome, RunReport, VersionUpdate};
use crate::error::{AppError, HostError, ReviewError};
use crate::host::{FileWrite, PullRequestSpec, RepoInfo, RepositoryHost};
use crate::imports::{is_python_source, scan_imports};
use crate::manifest::{apply_updates, get_parser};
use crate::progress::Progress;
use crate::publish::{
    branch_name, commit_message, pull_request_body, ForkWait, PublishStrategy,
    DEFAULT_BRANCH_PREFIX, PULL_REQUEST_TITLE,
};
use crate::registry::PackageIndex;
use crate::review::Reviewer;
use crate::update::UpdateJudge;
use crate::verify::TestRunner;
use chrono::Utc;
use std::collections::{BTreeSet, HashSet};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default time to wait for a new fork
pub const DEFAULT_FORK_TIMEOUT: Duration = Duration::from_secs(60);

/// Behavior switches for a run
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Prefix of the update branch name
    pub branch_prefix: String,
    /// Fork readiness polling
    pub fork_wait: ForkWait,
    /// Stop after review: no branch, no writes, no pull request
    pub dry_run: bool,
    /// Report imports instead of updating manifests
    pub scan_imports: bool,
    /// Draw progress bars during lookups
    pub show_progress: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            fork_wait: ForkWait::new(DEFAULT_FORK_TIMEOUT),
            dry_run: false,
            scan_imports: false,
            show_progress: false,
        }
    }
}

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator {
    host: Box<dyn RepositoryHost>,
    index: Box<dyn PackageIndex>,
    reviewer: Box<dyn Reviewer>,
    tester: Option<Box<dyn TestRunner>>,
    judge: UpdateJudge,
    config: OrchestratorConfig,
    /// Set once the operator quits the review
    cancelled: bool,
}

impl Orchestrator {
    /// Create an orchestrator from its collaborators
    pub fn new(
        host: Box<dyn RepositoryHost>,
        index: Box<dyn PackageIndex>,
        reviewer: Box<dyn Reviewer>,
        judge: UpdateJudge,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            host,
            index,
            reviewer,
            tester: None,
            judge,
            config,
            cancelled: false,
        }
    }

    /// Run the test script before opening each pull request
    pub fn with_test_runner(mut self, tester: Box<dyn TestRunner>) -> Self {
        self.tester = Some(tester);
        self
    }

    /// Process every repository in order
    ///
    /// Stops early only if the operator quits the review.
    pub async fn run(&mut self, repositories: &[String]) -> RunReport {
        let mut report = RunReport::new();

        for (idx, full_name) in repositories.iter().enumerate() {
            let outcome = self.check_and_update_repo(full_name).await;
            info!(repo = %full_name, outcome = %outcome, "repository done");
            report.push(full_name.clone(), outcome);

            if self.cancelled {
                let remaining = repositories.len() - idx - 1;
                if remaining > 0 {
                    warn!(remaining, "review cancelled; skipping remaining repositories");
                }
                break;
            }
        }

        report
    }

    /// Run one repository; every error becomes a `Failed` outcome
    pub async fn check_and_update_repo(&mut self, full_name: &str) -> RepoOutcome {
        match self.process_repo(full_name).await {
            Ok(outcome) => outcome,
            Err(AppError::Review(ReviewError::Cancelled)) => {
                info!(repo = full_name, "review cancelled by operator");
                self.cancelled = true;
                RepoOutcome::Rejected
            }
            Err(e) => {
                error!(repo = full_name, error = %e, "repository run aborted");
                RepoOutcome::failed(e.to_string())
            }
        }
    }

    async fn process_repo(&mut self, full_name: &str) -> Result<RepoOutcome, AppError> {
        let repo = self.host.repository(full_name).await?;
        info!(repo = %repo.full_name, branch = %repo.default_branch, "accessed repository");

        if self.config.scan_imports {
            let modules = self.scan_repository_imports(&repo).await?;
            return Ok(RepoOutcome::Imports { modules });
        }

        let updates = self.check_dependencies(&repo).await?;
        if updates.is_empty() {
            info!(repo = %repo.full_name, "no dependency updates found");
            return Ok(RepoOutcome::NoUpdates);
        }

        let approved = self.review_changes(&updates)?;
        if approved.is_empty() {
            info!(repo = %repo.full_name, "no changes were approved");
            return Ok(RepoOutcome::Rejected);
        }

        if !self.confirm_files(&repo, &approved).await? {
            return Ok(RepoOutcome::Rejected);
        }

        if self.config.dry_run {
            info!(repo = %repo.full_name, "dry run: skipping publication");
            return Ok(RepoOutcome::DryRun { updates: approved });
        }

        let url = self.publish(&repo, &approved).await?;
        Ok(RepoOutcome::PullRequest { url })
    }

    /// Proposed updates for every recognized manifest at the repository root
    ///
    /// Manifests missing from the listing are skipped, as are files that
    /// cannot be read or parsed.
    pub async fn check_dependencies(&self, repo: &RepoInfo) -> Result<FileUpdateSet, HostError> {
        let listing: HashSet<String> = self
            .host
            .list_root(&repo.full_name, &repo.default_branch)
            .await?
            .into_iter()
            .collect();

        let mut updates = FileUpdateSet::new();
        for kind in ManifestKind::all() {
            let path = kind.file_name();
            if !listing.contains(path) {
                warn!(repo = %repo.full_name, file = path, "file does not exist in the repository");
                continue;
            }

            match self.file_updates(repo, *kind).await {
                Ok(file_updates) => updates.insert(path, file_updates),
                Err(e) => error!(
                    repo = %repo.full_name,
                    file = path,
                    error = %e,
                    "error processing file"
                ),
            }
        }

        Ok(updates)
    }

    /// Proposed updates for one manifest, in scan order
    async fn file_updates(
        &self,
        repo: &RepoInfo,
        kind: ManifestKind,
    ) -> Result<Vec<VersionUpdate>, AppError> {
        let path = kind.file_name();
        let file = self
            .host
            .read_file(&repo.full_name, path, &repo.default_branch)
            .await?;
        let parser = get_parser(kind);
        let entries = parser.entries(&file.content)?;
        debug!(file = path, entries = entries.len(), "parsed manifest");

        let mut progress = Progress::new(self.config.show_progress);
        progress.start(entries.len() as u64, path);

        let mut updates = Vec::new();
        for entry in entries {
            progress.inc();
            let requirement = self.judge.parser().parse(&entry.requirement);
            if requirement.is_sentinel() {
                continue;
            }
            progress.set_message(requirement.package());

            let Some(latest) = self.index.latest_version(requirement.package()).await else {
                continue;
            };
            let Some(proposed) = self.judge.judge(&entry.requirement, &latest) else {
                debug!(package = %requirement.name, %latest, "up to date");
                continue;
            };
            let rendered = parser.render(&entry, &proposed.new);
            if let Some(update) = VersionUpdate::new(entry.text.as_str(), rendered) {
                info!(file = path, old = %update.old, new = %update.new, "update available");
                updates.push(update);
            }
        }

        progress.finish_and_clear();
        Ok(updates)
    }

    /// Ask the reviewer about every proposed change, keeping the approved ones
    pub fn review_changes(
        &mut self,
        updates: &FileUpdateSet,
    ) -> Result<FileUpdateSet, ReviewError> {
        let mut approved = FileUpdateSet::new();
        for file in updates {
            let mut kept = Vec::new();
            for update in &file.updates {
                if self.reviewer.approve_update(&file.path, update)? {
                    kept.push(update.clone());
                }
            }
            approved.insert(file.path.clone(), kept);
        }
        Ok(approved)
    }

    /// Show each file's final content; any rejection stops publication
    async fn confirm_files(
        &mut self,
        repo: &RepoInfo,
        approved: &FileUpdateSet,
    ) -> Result<bool, AppError> {
        for file in approved {
            let current = self
                .host
                .read_file(&repo.full_name, &file.path, &repo.default_branch)
                .await?;
            let content = apply_updates(&file.path, &current.content, &file.updates)?;
            if !self.reviewer.approve_file(&file.path, &content)? {
                info!(
                    repo = %repo.full_name,
                    file = %file.path,
                    "publishing of file was not approved"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Branch (or fork), write every approved file, open the pull request
    async fn publish(&self, repo: &RepoInfo, approved: &FileUpdateSet) -> Result<String, AppError> {
        let branch = branch_name(&self.config.branch_prefix, Utc::now());
        let strategy = PublishStrategy::select(repo);
        debug!(repo = %repo.full_name, ?strategy, "publishing");
        let target = strategy
            .prepare(self.host.as_ref(), repo, &branch, self.config.fork_wait)
            .await?;

        for file in approved {
            let current = self
                .host
                .read_file(&target.repo.full_name, &file.path, &target.branch)
                .await?;
            let content = apply_updates(&file.path, &current.content, &file.updates)?;
            let write = FileWrite {
                path: file.path.clone(),
                content,
                sha: current.sha,
                message: commit_message(&file.path),
                branch: target.branch.clone(),
            };
            self.host.write_file(&target.repo.full_name, &write).await?;
            info!(
                repo = %target.repo.full_name,
                file = %file.path,
                branch = %target.branch,
                "updated file"
            );
        }

        if let Some(ref tester) = self.tester {
            let report = tester.run_tests(&repo.full_name, &target.branch)?;
            debug!(
                repo = %repo.full_name,
                command = %report.command,
                stdout = %report.stdout,
                "tests passed"
            );
        }

        let pull_request = PullRequestSpec {
            title: PULL_REQUEST_TITLE.to_string(),
            body: pull_request_body(approved),
            head: target.head,
            base: repo.default_branch.clone(),
        };
        let url = self
            .host
            .open_pull_request(&repo.full_name, &pull_request)
            .await?;
        info!(repo = %repo.full_name, %url, "created pull request");
        Ok(url)
    }

    /// Sorted top-level imports across the repository's root `.py` files
    pub async fn scan_repository_imports(&self, repo: &RepoInfo) -> Result<Vec<String>, HostError> {
        let listing = self
            .host
            .list_root(&repo.full_name, &repo.default_branch)
            .await?;

        let mut progress = Progress::new(self.config.show_progress);
        progress.spinner(&format!("scanning imports in {}", repo.full_name));

        let mut modules = BTreeSet::new();
        for path in listing.iter().filter(|p| is_python_source(p)) {
            progress.set_message(path);
            match self
                .host
                .read_file(&repo.full_name, path, &repo.default_branch)
                .await
            {
                Ok(file) => modules.extend(scan_imports(&file.content, self.judge.parser())),
                Err(e) => warn!(
                    repo = %repo.full_name,
                    file = %path,
                    error = %e,
                    "skipping unreadable file"
                ),
            }
        }

        progress.finish_and_clear();
        Ok(modules.into_iter().collect())
    }
}
