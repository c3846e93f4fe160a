//! Source-hosting access
//!
//! This module provides:
//! - The `RepositoryHost` port: repository metadata, file read/write,
//!   branches, forks and pull requests
//! - GitHub REST API adapter

mod github;

pub use github::{GitHubHost, GITHUB_API_URL};

use crate::error::HostError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Repository metadata needed for publication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    /// `owner/name`
    pub full_name: String,
    /// Owner login
    pub owner: String,
    /// Branch pull requests target
    pub default_branch: String,
    /// Whether the acting credential may push directly
    pub can_push: bool,
}

/// A file's decoded content and its revision token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    /// Path relative to the repository root
    pub path: String,
    /// UTF-8 content
    pub content: String,
    /// Blob SHA required for conditional writes
    pub sha: String,
}

/// A conditional file update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    /// Path relative to the repository root
    pub path: String,
    /// New UTF-8 content
    pub content: String,
    /// Blob SHA the content was based on; a stale value must be rejected
    pub sha: String,
    /// Commit message
    pub message: String,
    /// Branch to commit on
    pub branch: String,
}

/// Pull request to open against a base repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSpec {
    /// Title
    pub title: String,
    /// Markdown body
    pub body: String,
    /// `branch` or `owner:branch` for forks
    pub head: String,
    /// Base branch
    pub base: String,
}

/// Trait for source-hosting platforms
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Fetch repository metadata
    async fn repository(&self, full_name: &str) -> Result<RepoInfo, HostError>;

    /// List paths at the repository root on `branch`
    async fn list_root(&self, full_name: &str, branch: &str) -> Result<Vec<String>, HostError>;

    /// Read a file and its revision token
    async fn read_file(
        &self,
        full_name: &str,
        path: &str,
        branch: &str,
    ) -> Result<FileContent, HostError>;

    /// Write a file; fails with `HostError::Conflict` if the token is stale
    async fn write_file(&self, full_name: &str, write: &FileWrite) -> Result<(), HostError>;

    /// Commit SHA at the head of `branch`
    async fn branch_head(&self, full_name: &str, branch: &str) -> Result<String, HostError>;

    /// Create `branch` pointing at `sha`
    async fn create_branch(&self, full_name: &str, branch: &str, sha: &str)
        -> Result<(), HostError>;

    /// Fork a repository into the acting account
    async fn create_fork(&self, full_name: &str) -> Result<RepoInfo, HostError>;

    /// Open a pull request, returning its web URL
    async fn open_pull_request(
        &self,
        full_name: &str,
        pull_request: &PullRequestSpec,
    ) -> Result<String, HostError>;
}
