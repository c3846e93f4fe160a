//! GitHub REST API adapter
//!
//! Endpoints used:
//! - `GET  /repos/{repo}`: default branch, owner, push permission
//! - `GET  /repos/{repo}/contents?ref=`: root listing
//! - `GET  /repos/{repo}/contents/{path}?ref=`: base64 content and blob SHA
//! - `PUT  /repos/{repo}/contents/{path}`: conditional update
//! - `GET  /repos/{repo}/branches/{branch}`: head commit
//! - `POST /repos/{repo}/git/refs`: new branch
//! - `POST /repos/{repo}/forks`: fork
//! - `POST /repos/{repo}/pulls`: pull request

use crate::error::HostError;
use crate::host::{FileContent, FileWrite, PullRequestSpec, RepoInfo, RepositoryHost};
use crate::http::HttpClient;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// GitHub API base URL
pub const GITHUB_API_URL: &str = "https://api.github.com";

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// GitHub adapter
pub struct GitHubHost {
    client: HttpClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    full_name: String,
    owner: OwnerResponse,
    default_branch: String,
    #[serde(default)]
    permissions: Option<PermissionsResponse>,
}

#[derive(Debug, Deserialize)]
struct OwnerResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct PermissionsResponse {
    #[serde(default)]
    push: bool,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    path: String,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    path: String,
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: CommitResponse,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
struct PutContentRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    branch: &'a str,
}

impl From<RepoResponse> for RepoInfo {
    fn from(repo: RepoResponse) -> Self {
        Self {
            full_name: repo.full_name,
            owner: repo.owner.login,
            default_branch: repo.default_branch,
            can_push: repo.permissions.is_some_and(|p| p.push),
        }
    }
}

impl GitHubHost {
    /// Create an adapter for api.github.com
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, GITHUB_API_URL)
    }

    /// Create an adapter for GitHub Enterprise or a test server
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource)
    }

    fn request(&self, method: Method, resource: &str) -> RequestBuilder {
        self.client
            .request(method, &self.url(resource))
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// GET `resource` as of `branch`
    fn request_at_ref(&self, resource: &str, branch: &str) -> RequestBuilder {
        let url = match Url::parse(&self.url(resource)) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("ref", branch);
                url.to_string()
            }
            Err(_) => format!("{}?ref={}", self.url(resource), branch),
        };
        self.client
            .request(Method::GET, &url)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// Send and map non-success statuses onto `HostError`
    async fn execute(
        &self,
        resource: &str,
        request: RequestBuilder,
    ) -> Result<Response, HostError> {
        debug!(resource, "GitHub request");
        let response = self.client.send(request).await.map_err(|e| {
            if e.is_timeout() {
                HostError::Timeout {
                    resource: resource.to_string(),
                }
            } else {
                HostError::network(resource, e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.message)
            .unwrap_or_default();
        Err(status_error(resource, status, message))
    }

    async fn decode<T: DeserializeOwned>(
        resource: &str,
        response: Response,
    ) -> Result<T, HostError> {
        response
            .json::<T>()
            .await
            .map_err(|e| HostError::decode(resource, e.to_string()))
    }
}

/// Map a non-success status to the error taxonomy
fn status_error(resource: &str, status: StatusCode, message: String) -> HostError {
    let resource = resource.to_string();
    match status {
        StatusCode::NOT_FOUND => HostError::NotFound { resource },
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            HostError::Conflict { resource, message }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            HostError::Forbidden { resource, message }
        }
        _ => HostError::Api {
            resource,
            status: status.as_u16(),
            message,
        },
    }
}

/// Decode the base64 payload of the contents API (wrapped at 60 columns)
fn decode_content(resource: &str, file: &FileResponse) -> Result<String, HostError> {
    if !file.encoding.is_empty() && file.encoding != "base64" {
        return Err(HostError::decode(
            resource,
            format!("unsupported encoding '{}'", file.encoding),
        ));
    }
    let compact: String = file
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| HostError::decode(resource, e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| HostError::decode(resource, e.to_string()))
}

#[async_trait]
impl RepositoryHost for GitHubHost {
    async fn repository(&self, full_name: &str) -> Result<RepoInfo, HostError> {
        let resource = format!("repos/{}", full_name);
        let response = self
            .execute(&resource, self.request(Method::GET, &resource))
            .await?;
        let repo: RepoResponse = Self::decode(&resource, response).await?;
        Ok(repo.into())
    }

    async fn list_root(&self, full_name: &str, branch: &str) -> Result<Vec<String>, HostError> {
        let resource = format!("repos/{}/contents", full_name);
        let request = self.request_at_ref(&resource, branch);
        let response = self.execute(&resource, request).await?;
        let entries: Vec<ContentEntry> = Self::decode(&resource, response).await?;
        Ok(entries.into_iter().map(|e| e.path).collect())
    }

    async fn read_file(
        &self,
        full_name: &str,
        path: &str,
        branch: &str,
    ) -> Result<FileContent, HostError> {
        let resource = format!("repos/{}/contents/{}", full_name, path);
        let request = self.request_at_ref(&resource, branch);
        let response = self.execute(&resource, request).await?;
        let file: FileResponse = Self::decode(&resource, response).await?;
        let content = decode_content(&resource, &file)?;
        Ok(FileContent {
            path: file.path,
            content,
            sha: file.sha,
        })
    }

    async fn write_file(&self, full_name: &str, write: &FileWrite) -> Result<(), HostError> {
        let resource = format!("repos/{}/contents/{}", full_name, write.path);
        let body = PutContentRequest {
            message: &write.message,
            content: STANDARD.encode(write.content.as_bytes()),
            sha: &write.sha,
            branch: &write.branch,
        };
        let request = self.request(Method::PUT, &resource).json(&body);
        self.execute(&resource, request).await?;
        Ok(())
    }

    async fn branch_head(&self, full_name: &str, branch: &str) -> Result<String, HostError> {
        let resource = format!("repos/{}/branches/{}", full_name, branch);
        let response = self
            .execute(&resource, self.request(Method::GET, &resource))
            .await?;
        let branch: BranchResponse = Self::decode(&resource, response).await?;
        Ok(branch.commit.sha)
    }

    async fn create_branch(
        &self,
        full_name: &str,
        branch: &str,
        sha: &str,
    ) -> Result<(), HostError> {
        let resource = format!("repos/{}/git/refs", full_name);
        let request = self.request(Method::POST, &resource).json(&json!({
            "ref": format!("refs/heads/{}", branch),
            "sha": sha,
        }));
        self.execute(&resource, request).await?;
        Ok(())
    }

    async fn create_fork(&self, full_name: &str) -> Result<RepoInfo, HostError> {
        let resource = format!("repos/{}/forks", full_name);
        let request = self.request(Method::POST, &resource).json(&json!({}));
        let response = self.execute(&resource, request).await?;
        let fork: RepoResponse = Self::decode(&resource, response).await?;
        let mut info = RepoInfo::from(fork);
        // The fork belongs to the acting account
        info.can_push = true;
        Ok(info)
    }

    async fn open_pull_request(
        &self,
        full_name: &str,
        pull_request: &PullRequestSpec,
    ) -> Result<String, HostError> {
        let resource = format!("repos/{}/pulls", full_name);
        let request = self.request(Method::POST, &resource).json(&json!({
            "title": pull_request.title,
            "body": pull_request.body,
            "head": pull_request.head,
            "base": pull_request.base,
        }));
        let response = self.execute(&resource, request).await?;
        let pull: PullResponse = Self::decode(&resource, response).await?;
        Ok(pull.html_url)
    }
}
