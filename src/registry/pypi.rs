//! PyPI JSON API adapter
//!
//! Fetches package metadata from PyPI.
//! API endpoint: https://pypi.org/pypi/{package}/json
//!
//! `info.version` is the answer unless it is a pre-release, in which case
//! the highest stable, non-yanked entry of `releases` is used instead.

use crate::error::RegistryError;
use crate::http::HttpClient;
use crate::registry::PackageIndex;
use crate::update::Version;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;

/// PyPI API base URL
pub const PYPI_API_URL: &str = "https://pypi.org/pypi";

/// PyPI adapter
pub struct PyPIAdapter {
    client: HttpClient,
    base_url: String,
}

/// PyPI package metadata response
#[derive(Debug, Deserialize)]
struct PyPIResponse {
    info: PackageInfo,
    /// Release files keyed by version
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFile>>,
}

#[derive(Debug, Deserialize)]
struct PackageInfo {
    version: String,
}

/// Release file information
#[derive(Debug, Deserialize)]
struct ReleaseFile {
    #[serde(default)]
    yanked: bool,
}

impl PyPIAdapter {
    /// Create a new PyPI adapter against the public index
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, PYPI_API_URL)
    }

    /// Create a PyPI adapter against a mirror or test server
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build the URL for a package
    fn build_url(&self, package: &str) -> String {
        format!("{}/{}/json", self.base_url, package)
    }
}

/// Highest stable version that has at least one non-yanked file
fn latest_stable_release(releases: &HashMap<String, Vec<ReleaseFile>>) -> Option<String> {
    releases
        .iter()
        .filter(|(_, files)| files.iter().any(|f| !f.yanked))
        .filter_map(|(raw, _)| Version::parse(raw).ok().map(|v| (v, raw)))
        .filter(|(v, _)| !v.is_prerelease())
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, raw)| raw.clone())
}

#[async_trait]
impl PackageIndex for PyPIAdapter {
    fn registry_name(&self) -> &'static str {
        "PyPI"
    }

    async fn fetch_latest(&self, package: &str) -> Result<String, RegistryError> {
        let url = self.build_url(package);
        let response = self
            .client
            .send(self.client.get(&url))
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RegistryError::timeout(package, self.registry_name())
                } else {
                    RegistryError::network_error(package, self.registry_name(), e.to_string())
                }
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RegistryError::package_not_found(package, self.registry_name()));
        }
        if !response.status().is_success() {
            return Err(RegistryError::network_error(
                package,
                self.registry_name(),
                format!("HTTP {}", response.status()),
            ));
        }

        let body: PyPIResponse =
            response
                .json()
                .await
                .map_err(|e| RegistryError::InvalidResponse {
                    package: package.to_string(),
                    registry: self.registry_name().to_string(),
                    message: format!("failed to parse JSON: {}", e),
                })?;

        let advertised = Version::parse(&body.info.version);
        if matches!(advertised, Ok(ref v) if !v.is_prerelease()) {
            return Ok(body.info.version);
        }

        latest_stable_release(&body.releases).ok_or_else(|| RegistryError::NoStableRelease {
            package: package.to_string(),
            registry: self.registry_name().to_string(),
        })
    }
}
