//! Per-repository outcomes and the batch report

use super::FileUpdateSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal state of one repository run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepoOutcome {
    /// A pull request was opened
    PullRequest {
        /// Web URL of the pull request
        url: String,
    },
    /// No manifest needed an update
    NoUpdates,
    /// The operator rejected every change or a file
    Rejected,
    /// Updates were approved but publication was skipped (`--dry-run`)
    DryRun {
        /// Approved updates that would have been published
        updates: FileUpdateSet,
    },
    /// Top-level imports found in the repository (`--scan-imports`)
    Imports {
        /// Sorted module names
        modules: Vec<String>,
    },
    /// The run aborted
    Failed {
        /// Human-readable failure description
        message: String,
    },
}

impl RepoOutcome {
    /// Creates a failure outcome
    pub fn failed(message: impl Into<String>) -> Self {
        RepoOutcome::Failed {
            message: message.into(),
        }
    }

    /// Returns the pull-request URL on success
    pub fn pull_request_url(&self) -> Option<&str> {
        match self {
            RepoOutcome::PullRequest { url } => Some(url),
            _ => None,
        }
    }

    /// Returns true if the run aborted
    pub fn is_failure(&self) -> bool {
        matches!(self, RepoOutcome::Failed { .. })
    }
}

impl fmt::Display for RepoOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoOutcome::PullRequest { url } => write!(f, "pull request opened: {}", url),
            RepoOutcome::NoUpdates => write!(f, "no updates needed"),
            RepoOutcome::Rejected => write!(f, "changes not approved"),
            RepoOutcome::DryRun { updates } => {
                write!(f, "dry run: {} update(s) approved", updates.total_updates())
            }
            RepoOutcome::Imports { modules } => write!(f, "{} import(s) found", modules.len()),
            RepoOutcome::Failed { message } => write!(f, "failed: {}", message),
        }
    }
}

/// Outcome of a single repository in the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoReport {
    /// Repository full name (`owner/name`)
    pub repository: String,
    /// What happened
    pub outcome: RepoOutcome,
}

/// Outcomes of the whole batch, in processing order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Per-repository outcomes
    pub repositories: Vec<RepoReport>,
}

impl RunReport {
    /// Creates an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for a repository
    pub fn push(&mut self, repository: impl Into<String>, outcome: RepoOutcome) {
        self.repositories.push(RepoReport {
            repository: repository.into(),
            outcome,
        });
    }

    /// Number of pull requests opened
    pub fn pull_request_count(&self) -> usize {
        self.repositories
            .iter()
            .filter(|r| r.outcome.pull_request_url().is_some())
            .count()
    }

    /// Number of repositories whose run aborted
    pub fn failure_count(&self) -> usize {
        self.repositories
            .iter()
            .filter(|r| r.outcome.is_failure())
            .count()
    }

    /// Returns true if any repository failed
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }
}
