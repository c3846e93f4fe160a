//! Publication of approved updates
//!
//! Two strategies make a branch the bot can commit to:
//! - `Direct`: branch in the repository itself, when the credential can push
//! - `Fork`: fork the repository, wait for the fork to become usable, branch there
//!
//! Also home to the branch name, commit message and pull request text.

use crate::domain::FileUpdateSet;
use crate::error::HostError;
use crate::host::{RepoInfo, RepositoryHost};
use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Pull request title
pub const PULL_REQUEST_TITLE: &str = "Update Dependencies";

/// Default branch name prefix
pub const DEFAULT_BRANCH_PREFIX: &str = "update-dependencies";

/// Default interval between fork readiness checks
pub const DEFAULT_FORK_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Branch name for a run started at `now`
pub fn branch_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", prefix, now.timestamp())
}

/// Commit message for one manifest
pub fn commit_message(path: &str) -> String {
    format!("Update dependencies in {}", path)
}

/// Pull request body listing every applied change, grouped per file
pub fn pull_request_body(updates: &FileUpdateSet) -> String {
    let mut body =
        String::from("This PR updates project dependencies to their latest versions.\n");
    for file in updates {
        let _ = write!(body, "\n### `{}`\n\n", file.path);
        for update in &file.updates {
            let _ = writeln!(body, "- `{}` → `{}`", update.old, update.new);
        }
    }
    body
}

/// How long to wait for a new fork
#[derive(Debug, Clone, Copy)]
pub struct ForkWait {
    /// Give up after this long
    pub timeout: Duration,
    /// Delay between readiness checks
    pub interval: Duration,
}

impl ForkWait {
    /// Wait up to `timeout`, polling at the default interval
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: DEFAULT_FORK_POLL_INTERVAL,
        }
    }
}

/// Where approved files are committed and how the pull request refers to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    /// Repository that receives the commits
    pub repo: RepoInfo,
    /// Branch that receives the commits
    pub branch: String,
    /// Pull request head (`branch` or `owner:branch`)
    pub head: String,
}

/// Strategy for obtaining a writable branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStrategy {
    /// Branch in the base repository
    Direct,
    /// Branch in a fork owned by the acting account
    Fork,
}

impl PublishStrategy {
    /// Pick the strategy from the credential's permission on `repo`
    pub fn select(repo: &RepoInfo) -> Self {
        if repo.can_push {
            PublishStrategy::Direct
        } else {
            PublishStrategy::Fork
        }
    }

    /// Ensure `branch` exists somewhere the bot can write to
    pub async fn prepare(
        &self,
        host: &dyn RepositoryHost,
        repo: &RepoInfo,
        branch: &str,
        fork_wait: ForkWait,
    ) -> Result<PublishTarget, HostError> {
        match self {
            PublishStrategy::Direct => {
                let sha = host.branch_head(&repo.full_name, &repo.default_branch).await?;
                host.create_branch(&repo.full_name, branch, &sha).await?;
                info!(repo = %repo.full_name, branch, "created branch");
                Ok(PublishTarget {
                    repo: repo.clone(),
                    branch: branch.to_string(),
                    head: branch.to_string(),
                })
            }
            PublishStrategy::Fork => {
                let fork = host.create_fork(&repo.full_name).await?;
                info!(repo = %repo.full_name, fork = %fork.full_name, "created fork");
                let sha = wait_for_fork(host, &fork, fork_wait).await?;
                host.create_branch(&fork.full_name, branch, &sha).await?;
                info!(repo = %fork.full_name, branch, "created branch in fork");
                Ok(PublishTarget {
                    head: format!("{}:{}", fork.owner, branch),
                    branch: branch.to_string(),
                    repo: fork,
                })
            }
        }
    }
}

/// Poll the fork's default branch until it resolves, returning its head SHA
async fn wait_for_fork(
    host: &dyn RepositoryHost,
    fork: &RepoInfo,
    wait: ForkWait,
) -> Result<String, HostError> {
    let deadline = Instant::now() + wait.timeout;
    loop {
        match host.branch_head(&fork.full_name, &fork.default_branch).await {
            Ok(sha) => return Ok(sha),
            Err(e) if e.is_not_found() || e.is_conflict() => {
                if Instant::now() >= deadline {
                    return Err(HostError::ForkNotReady {
                        repository: fork.full_name.clone(),
                        seconds: wait.timeout.as_secs(),
                    });
                }
                debug!(fork = %fork.full_name, "fork not ready yet");
                tokio::time::sleep(wait.interval).await;
            }
            Err(e) => return Err(e),
        }
    }
}
