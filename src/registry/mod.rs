//! Package registry lookup
//!
//! This module provides:
//! - The `PackageIndex` port consumed by the orchestrator
//! - PyPI JSON API adapter
//!
//! Lookups never fail from the caller's point of view: `latest_version`
//! logs the error and reports the package as absent.

mod pypi;

pub use pypi::{PyPIAdapter, PYPI_API_URL};

use crate::error::RegistryError;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Trait for package registries
#[async_trait]
pub trait PackageIndex: Send + Sync {
    /// Get the registry name
    fn registry_name(&self) -> &'static str;

    /// Fetch the latest stable version of a package
    async fn fetch_latest(&self, package: &str) -> Result<String, RegistryError>;

    /// Latest stable version, or `None` if the lookup failed for any reason
    async fn latest_version(&self, package: &str) -> Option<String> {
        match self.fetch_latest(package).await {
            Ok(version) => {
                debug!(package, %version, registry = self.registry_name(), "latest version");
                Some(version)
            }
            Err(RegistryError::PackageNotFound { .. }) => {
                warn!(package, registry = self.registry_name(), "package not found");
                None
            }
            Err(e) => {
                warn!(package, error = %e, "registry lookup failed");
                None
            }
        }
    }
}
