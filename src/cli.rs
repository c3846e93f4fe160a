//! CLI argument parsing module for reqbump

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Dependency-update bot for Python repositories on GitHub
#[derive(Parser, Debug, Clone)]
#[command(
    name = "reqbump",
    version,
    about = "Propose Python requirement bumps as GitHub pull requests"
)]
pub struct CliArgs {
    /// Repositories to process (owner/name)
    pub repositories: Vec<String>,

    /// File with one repository per line (`#` starts a comment)
    #[arg(long, value_name = "PATH")]
    pub repos_file: Option<PathBuf>,

    /// Comma-separated repositories, added to the positional list
    #[arg(long, env = "REQBUMP_REPOSITORIES", value_name = "LIST", hide_env_values = true)]
    pub repositories_env: Option<String>,

    /// GitHub access token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, default_value = crate::host::GITHUB_API_URL)]
    pub api_url: String,

    /// PyPI JSON API base URL
    #[arg(long, default_value = crate::registry::PYPI_API_URL)]
    pub registry_url: String,

    // Requirement filters
    /// Never update this package (can be specified multiple times)
    #[arg(long = "skip-package", value_name = "NAME", action = ArgAction::Append)]
    pub skip_packages: Vec<String>,

    /// Clear the built-in list of skipped names
    #[arg(long)]
    pub no_default_skips: bool,

    // Review and publication
    /// Approve every change and file without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Stop after review: no branch, no writes, no pull request
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Prefix of the update branch
    #[arg(long, default_value = crate::publish::DEFAULT_BRANCH_PREFIX)]
    pub branch_prefix: String,

    /// Seconds to wait for a new fork to become usable
    #[arg(long, default_value_t = 60, value_name = "SECS")]
    pub fork_timeout: u64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    pub timeout: u64,

    /// Retries for throttled or failed GitHub requests
    #[arg(long, default_value_t = 0)]
    pub retries: u32,

    // Verification
    /// Directory holding local checkouts; enables the test script
    #[arg(long, value_name = "DIR")]
    pub test_checkout: Option<PathBuf>,

    /// Test script run inside each checkout
    #[arg(long, default_value = crate::verify::DEFAULT_TEST_SCRIPT)]
    pub test_script: String,

    /// Report top-level imports of root `.py` files instead of updating
    #[arg(long)]
    pub scan_imports: bool,

    // Output options
    /// Output the report in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}
