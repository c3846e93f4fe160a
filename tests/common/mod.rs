//! In-memory collaborators for driving the orchestrator headlessly

#![allow(dead_code)]

use async_trait::async_trait;
use reqbump::domain::VersionUpdate;
use reqbump::error::{HostError, RegistryError, ReviewError};
use reqbump::host::{FileContent, FileWrite, PullRequestSpec, RepoInfo, RepositoryHost};
use reqbump::registry::PackageIndex;
use reqbump::review::Reviewer;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Account that owns forks created by the fake host
pub const BOT_ACCOUNT: &str = "bot";

#[derive(Default)]
struct HostState {
    repos: HashMap<String, RepoInfo>,
    /// (repository, branch) -> path -> (content, sha)
    files: HashMap<(String, String), BTreeMap<String, (String, String)>>,
    revision: u64,
    branches: Vec<(String, String)>,
    writes: Vec<(String, FileWrite)>,
    pull_requests: Vec<(String, PullRequestSpec)>,
    forks: Vec<String>,
}

impl HostState {
    fn next_sha(&mut self) -> String {
        self.revision += 1;
        format!("rev{}", self.revision)
    }
}

/// A repository host keeping everything in memory; clones share state
#[derive(Clone, Default)]
pub struct InMemoryHost {
    state: Arc<Mutex<HostState>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a repository with a `main` default branch
    pub fn add_repo(&self, full_name: &str, can_push: bool) {
        let mut state = self.state.lock().unwrap();
        let owner = full_name.split('/').next().unwrap_or_default().to_string();
        state.repos.insert(
            full_name.to_string(),
            RepoInfo {
                full_name: full_name.to_string(),
                owner,
                default_branch: "main".to_string(),
                can_push,
            },
        );
        state
            .files
            .entry((full_name.to_string(), "main".to_string()))
            .or_default();
    }

    /// Put a file on the default branch
    pub fn add_file(&self, full_name: &str, path: &str, content: &str) {
        let mut state = self.state.lock().unwrap();
        let sha = state.next_sha();
        state
            .files
            .entry((full_name.to_string(), "main".to_string()))
            .or_default()
            .insert(path.to_string(), (content.to_string(), sha));
    }

    /// Current content of a file on a branch
    pub fn file(&self, full_name: &str, branch: &str, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(&(full_name.to_string(), branch.to_string()))
            .and_then(|files| files.get(path))
            .map(|(content, _)| content.clone())
    }

    pub fn writes(&self) -> Vec<(String, FileWrite)> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn pull_requests(&self) -> Vec<(String, PullRequestSpec)> {
        self.state.lock().unwrap().pull_requests.clone()
    }

    pub fn branches(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().branches.clone()
    }

    pub fn forks(&self) -> Vec<String> {
        self.state.lock().unwrap().forks.clone()
    }
}

#[async_trait]
impl RepositoryHost for InMemoryHost {
    async fn repository(&self, full_name: &str) -> Result<RepoInfo, HostError> {
        let state = self.state.lock().unwrap();
        state
            .repos
            .get(full_name)
            .cloned()
            .ok_or_else(|| HostError::not_found(format!("repos/{}", full_name)))
    }

    async fn list_root(&self, full_name: &str, branch: &str) -> Result<Vec<String>, HostError> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(&(full_name.to_string(), branch.to_string()))
            .map(|files| files.keys().cloned().collect())
            .ok_or_else(|| HostError::not_found(format!("repos/{}/contents", full_name)))
    }

    async fn read_file(
        &self,
        full_name: &str,
        path: &str,
        branch: &str,
    ) -> Result<FileContent, HostError> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(&(full_name.to_string(), branch.to_string()))
            .and_then(|files| files.get(path))
            .map(|(content, sha)| FileContent {
                path: path.to_string(),
                content: content.clone(),
                sha: sha.clone(),
            })
            .ok_or_else(|| HostError::not_found(format!("repos/{}/contents/{}", full_name, path)))
    }

    async fn write_file(&self, full_name: &str, write: &FileWrite) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        let sha = state.next_sha();
        let resource = format!("repos/{}/contents/{}", full_name, write.path);
        let files = state
            .files
            .get_mut(&(full_name.to_string(), write.branch.clone()))
            .ok_or_else(|| HostError::not_found(resource.clone()))?;

        match files.get(&write.path) {
            Some((_, current)) if *current != write.sha => {
                return Err(HostError::conflict(resource, "sha does not match"));
            }
            _ => {}
        }
        files.insert(write.path.clone(), (write.content.clone(), sha));
        state.writes.push((full_name.to_string(), write.clone()));
        Ok(())
    }

    async fn branch_head(&self, full_name: &str, branch: &str) -> Result<String, HostError> {
        let state = self.state.lock().unwrap();
        if state
            .files
            .contains_key(&(full_name.to_string(), branch.to_string()))
        {
            Ok(format!("head-{}-{}", full_name, branch))
        } else {
            Err(HostError::not_found(format!(
                "repos/{}/branches/{}",
                full_name, branch
            )))
        }
    }

    async fn create_branch(
        &self,
        full_name: &str,
        branch: &str,
        _sha: &str,
    ) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        let key = (full_name.to_string(), branch.to_string());
        if state.files.contains_key(&key) {
            return Err(HostError::conflict("git/refs", "Reference already exists"));
        }
        let base = state
            .files
            .get(&(full_name.to_string(), "main".to_string()))
            .cloned()
            .unwrap_or_default();
        state.files.insert(key, base);
        state
            .branches
            .push((full_name.to_string(), branch.to_string()));
        Ok(())
    }

    async fn create_fork(&self, full_name: &str) -> Result<RepoInfo, HostError> {
        let mut state = self.state.lock().unwrap();
        let name = full_name.rsplit('/').next().unwrap_or(full_name);
        let fork_name = format!("{}/{}", BOT_ACCOUNT, name);
        let fork = RepoInfo {
            full_name: fork_name.clone(),
            owner: BOT_ACCOUNT.to_string(),
            default_branch: "main".to_string(),
            can_push: true,
        };

        let files = state
            .files
            .get(&(full_name.to_string(), "main".to_string()))
            .cloned()
            .unwrap_or_default();
        state.files.insert((fork_name.clone(), "main".to_string()), files);
        state.repos.insert(fork_name.clone(), fork.clone());
        state.forks.push(fork_name);
        Ok(fork)
    }

    async fn open_pull_request(
        &self,
        full_name: &str,
        pull_request: &PullRequestSpec,
    ) -> Result<String, HostError> {
        let mut state = self.state.lock().unwrap();
        state
            .pull_requests
            .push((full_name.to_string(), pull_request.clone()));
        Ok(format!(
            "https://github.com/{}/pull/{}",
            full_name,
            state.pull_requests.len()
        ))
    }
}

/// Package index answering from a fixed table
pub struct ScriptedIndex {
    versions: HashMap<String, String>,
}

impl ScriptedIndex {
    pub fn new(versions: &[(&str, &str)]) -> Self {
        Self {
            versions: versions
                .iter()
                .map(|(name, version)| (name.to_lowercase(), version.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl PackageIndex for ScriptedIndex {
    fn registry_name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_latest(&self, package: &str) -> Result<String, RegistryError> {
        self.versions
            .get(&package.to_lowercase())
            .cloned()
            .ok_or_else(|| RegistryError::package_not_found(package, "scripted"))
    }
}

/// Reviewer answering change prompts from a queue
///
/// Once the queue runs dry every change is rejected. File prompts always
/// get `file_answer`.
pub struct ScriptedReviewer {
    answers: VecDeque<bool>,
    file_answer: bool,
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl ScriptedReviewer {
    pub fn new(answers: &[bool], file_answer: bool) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            file_answer,
            seen: Arc::default(),
        }
    }

    pub fn rejecting_all() -> Self {
        Self::new(&[], true)
    }

    /// Handle on the `(path, final content)` pairs shown for approval
    pub fn shown_files(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.seen)
    }
}

impl Reviewer for ScriptedReviewer {
    fn approve_update(
        &mut self,
        _path: &str,
        _update: &VersionUpdate,
    ) -> Result<bool, ReviewError> {
        Ok(self.answers.pop_front().unwrap_or(false))
    }

    fn approve_file(&mut self, path: &str, content: &str) -> Result<bool, ReviewError> {
        self.seen
            .lock()
            .unwrap()
            .push((path.to_string(), content.to_string()));
        Ok(self.file_answer)
    }
}
