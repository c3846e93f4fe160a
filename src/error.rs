//! Application error types using thiserror
//!
//! Error hierarchy:
//! - VersionError: Unparsable versions and specifiers
//! - ManifestError: Issues with manifest content extraction and rewriting
//! - RegistryError: Issues with package registry communication
//! - HostError: Issues with the source-hosting API
//! - ReviewError: Operator prompt failures
//! - ConfigError: Issues with CLI / environment configuration

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Source-hosting API errors
    #[error(transparent)]
    Host(#[from] HostError),

    /// Operator review errors
    #[error(transparent)]
    Review(#[from] ReviewError),

    /// Test-script verification failures
    #[error(transparent)]
    Verify(#[from] VerifyError),
}

/// Errors from parsing PEP 440 versions and specifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// Version string does not follow PEP 440
    #[error("invalid version '{value}'")]
    InvalidVersion { value: String },

    /// Specifier clause is malformed
    #[error("invalid specifier '{value}': {message}")]
    InvalidSpecifier { value: String, message: String },
}

/// Errors related to manifest content
#[derive(Error, Debug)]
pub enum ManifestError {
    /// A requirement to replace was not found in the file content
    #[error("requirement '{requirement}' not found in {path}")]
    RequirementNotFound { path: String, requirement: String },

    /// TOML parsing error (for Pipfile)
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: String, message: String },

    /// Unsupported manifest format
    #[error("unsupported manifest format: {path}")]
    UnsupportedFormat { path: String },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found in {registry} registry")]
    PackageNotFound { package: String, registry: String },

    /// Network request failed
    #[error("failed to fetch package '{package}' from {registry}: {message}")]
    NetworkError {
        package: String,
        registry: String,
        message: String,
    },

    /// Invalid response from registry
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Registry has no stable release for the package
    #[error("no stable release of '{package}' in {registry}")]
    NoStableRelease { package: String, registry: String },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },
}

/// Errors from the source-hosting API
#[derive(Error, Debug)]
pub enum HostError {
    /// Resource does not exist (or is hidden from the credential)
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// Revision token is stale or the ref already exists
    #[error("conflict on {resource}: {message}")]
    Conflict { resource: String, message: String },

    /// Credential lacks permission
    #[error("forbidden: {resource}: {message}")]
    Forbidden { resource: String, message: String },

    /// Any other non-success status
    #[error("API error {status} on {resource}: {message}")]
    Api {
        resource: String,
        status: u16,
        message: String,
    },

    /// Transport failure
    #[error("request to {resource} failed: {message}")]
    Network { resource: String, message: String },

    /// Response body could not be decoded
    #[error("invalid response from {resource}: {message}")]
    Decode { resource: String, message: String },

    /// Request timed out
    #[error("timeout while requesting {resource}")]
    Timeout { resource: String },

    /// A newly created fork did not become usable in time
    #[error("fork {repository} not ready after {seconds}s")]
    ForkNotReady { repository: String, seconds: u64 },
}

/// Errors from the interactive review gate
#[derive(Error, Debug)]
pub enum ReviewError {
    /// Reading or writing the terminal failed
    #[error("review prompt failed: {0}")]
    Io(#[from] std::io::Error),

    /// The operator quit the review
    #[error("review cancelled by operator")]
    Cancelled,
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No repositories given
    #[error(
        "no repositories configured: pass owner/name arguments, --repos-file or REQBUMP_REPOSITORIES"
    )]
    NoRepositories,

    /// Repository is not in `owner/name` form
    #[error("invalid repository '{value}': expected 'owner/name'")]
    InvalidRepository { value: String },

    /// Repository list file could not be read
    #[error("failed to read repository list {path}: {source}")]
    ReposFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Conflicting options
    #[error("conflicting options: {message}")]
    ConflictingOptions { message: String },
}

/// Errors from running the external test script
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Checkout directory for the repository is missing
    #[error("checkout not found: {path}")]
    CheckoutMissing { path: std::path::PathBuf },

    /// A command could not be spawned
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A command exited unsuccessfully
    #[error("'{command}' failed with status {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

impl VersionError {
    /// Creates a new InvalidVersion error
    pub fn invalid_version(value: impl Into<String>) -> Self {
        VersionError::InvalidVersion {
            value: value.into(),
        }
    }

    /// Creates a new InvalidSpecifier error
    pub fn invalid_specifier(value: impl Into<String>, message: impl Into<String>) -> Self {
        VersionError::InvalidSpecifier {
            value: value.into(),
            message: message.into(),
        }
    }
}

impl ManifestError {
    /// Creates a new RequirementNotFound error
    pub fn requirement_not_found(path: impl Into<String>, requirement: impl Into<String>) -> Self {
        ManifestError::RequirementNotFound {
            path: path.into(),
            requirement: requirement.into(),
        }
    }

    /// Creates a new UnsupportedFormat error
    pub fn unsupported_format(path: impl Into<String>) -> Self {
        ManifestError::UnsupportedFormat { path: path.into() }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new NetworkError
    pub fn network_error(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::NetworkError {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }
}

impl HostError {
    /// Creates a new NotFound error
    pub fn not_found(resource: impl Into<String>) -> Self {
        HostError::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a new Conflict error
    pub fn conflict(resource: impl Into<String>, message: impl Into<String>) -> Self {
        HostError::Conflict {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Creates a new Network error
    pub fn network(resource: impl Into<String>, message: impl Into<String>) -> Self {
        HostError::Network {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Creates a new Decode error
    pub fn decode(resource: impl Into<String>, message: impl Into<String>) -> Self {
        HostError::Decode {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Returns true if the error means the resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, HostError::NotFound { .. })
    }

    /// Returns true if the error is a stale-token or existing-ref conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, HostError::Conflict { .. })
    }
}
