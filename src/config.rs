//! Run configuration assembled from CLI flags, environment and `.env`
//!
//! Repository sources are merged in this order, de-duplicated with first
//! occurrence winning:
//! - positional `owner/name` arguments
//! - `--repos-file` (one per line, `#` comments allowed)
//! - `REQBUMP_REPOSITORIES` (comma separated)

use crate::cli::CliArgs;
use crate::error::ConfigError;
use crate::output::OutputConfig;
use crate::parser::RequirementParser;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static REPOSITORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*/[A-Za-z0-9._-]+$").unwrap());

/// Optional test-script verification settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConfig {
    /// Directory holding one checkout per repository
    pub checkout_root: PathBuf,
    /// Script run inside the checkout
    pub script: String,
}

/// Validated settings for one invocation
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Repositories in processing order
    pub repositories: Vec<String>,
    /// GitHub access token
    pub token: Option<String>,
    /// GitHub REST API base URL
    pub api_url: String,
    /// PyPI JSON API base URL
    pub registry_url: String,
    /// Extra names added to the deny-list
    pub skip_packages: Vec<String>,
    /// Whether the built-in deny-list applies
    pub default_skips: bool,
    /// Approve everything without prompting
    pub auto_approve: bool,
    /// Stop after review
    pub dry_run: bool,
    /// Update branch prefix
    pub branch_prefix: String,
    /// Maximum wait for a new fork
    pub fork_timeout: Duration,
    /// HTTP request timeout
    pub http_timeout: Duration,
    /// Retries for throttled or failed GitHub requests
    pub retries: u32,
    /// Test-script verification, when enabled
    pub test: Option<TestConfig>,
    /// Import discovery mode
    pub scan_imports: bool,
    /// Report rendering
    pub output: OutputConfig,
    /// Debug logging
    pub verbose: bool,
    /// Warnings only, no progress bars
    pub quiet: bool,
}

impl BotConfig {
    /// Build and validate the configuration from parsed arguments
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        if args.verbose && args.quiet {
            return Err(ConfigError::ConflictingOptions {
                message: "--verbose and --quiet cannot be used together".to_string(),
            });
        }

        let mut sources = args.repositories.clone();
        if let Some(ref path) = args.repos_file {
            sources.extend(read_repos_file(path)?);
        }
        if let Some(ref list) = args.repositories_env {
            sources.extend(split_list(list));
        }

        let repositories = merge_repositories(sources)?;
        if repositories.is_empty() {
            return Err(ConfigError::NoRepositories);
        }

        let test = args.test_checkout.as_ref().map(|root| TestConfig {
            checkout_root: root.clone(),
            script: args.test_script.clone(),
        });

        Ok(Self {
            repositories,
            token: args.token.clone().filter(|t| !t.trim().is_empty()),
            api_url: args.api_url.trim_end_matches('/').to_string(),
            registry_url: args.registry_url.trim_end_matches('/').to_string(),
            skip_packages: args.skip_packages.clone(),
            default_skips: !args.no_default_skips,
            auto_approve: args.yes,
            dry_run: args.dry_run,
            branch_prefix: args.branch_prefix.clone(),
            fork_timeout: Duration::from_secs(args.fork_timeout),
            http_timeout: Duration::from_secs(args.timeout),
            retries: args.retries,
            test,
            scan_imports: args.scan_imports,
            output: OutputConfig::from_cli(args.json, args.verbose, args.quiet),
            verbose: args.verbose,
            quiet: args.quiet,
        })
    }

    /// Requirement parser with the configured deny-list
    pub fn requirement_parser(&self) -> RequirementParser {
        let parser = if self.default_skips {
            RequirementParser::new()
        } else {
            RequirementParser::without_default_skips()
        };
        parser.with_skipped_names(self.skip_packages.iter().map(String::as_str))
    }

    /// Default tracing filter directive for this verbosity
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "reqbump=debug"
        } else if self.quiet {
            "reqbump=warn"
        } else {
            "reqbump=info"
        }
    }
}

/// Read a repository list file, ignoring blank lines and `#` comments
pub fn read_repos_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReposFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn split_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validate `owner/name` entries and drop duplicates, keeping the first
pub fn merge_repositories<I>(sources: I) -> Result<Vec<String>, ConfigError>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for value in sources {
        let value = value.trim().to_string();
        if !is_valid_repository(&value) {
            return Err(ConfigError::InvalidRepository { value });
        }
        if seen.insert(value.to_lowercase()) {
            merged.push(value);
        }
    }

    Ok(merged)
}

/// Returns true for `owner/name`
pub fn is_valid_repository(value: &str) -> bool {
    REPOSITORY_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(argv: &[&str]) -> CliArgs {
        let mut full = vec!["reqbump"];
        full.extend_from_slice(argv);
        let mut args = CliArgs::parse_from(full);
        // Keep the test independent of the caller's environment
        args.repositories_env = None;
        args.token = None;
        args
    }

    #[test]
    fn test_is_valid_repository() {
        assert!(is_valid_repository("octo/app"));
        assert!(is_valid_repository("octo-org/my.app_2"));
        assert!(!is_valid_repository("octo"));
        assert!(!is_valid_repository("octo/app/extra"));
        assert!(!is_valid_repository("/app"));
        assert!(!is_valid_repository("octo/"));
        assert!(!is_valid_repository("https://github.com/octo/app"));
    }

    #[test]
    fn test_merge_deduplicates_in_order() {
        let merged = merge_repositories(
            ["octo/b", "octo/a", "Octo/B", "octo/c"]
                .into_iter()
                .map(String::from),
        )
        .unwrap();
        assert_eq!(merged, vec!["octo/b", "octo/a", "octo/c"]);
    }

    #[test]
    fn test_merge_rejects_invalid() {
        let err = merge_repositories(vec!["octo/app".to_string(), "nope".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRepository { value } if value == "nope"));
    }

    #[test]
    fn test_read_repos_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# repositories").unwrap();
        writeln!(file, "octo/app").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "octo/lib   # legacy").unwrap();
        let repos = read_repos_file(file.path()).unwrap();
        assert_eq!(repos, vec!["octo/app", "octo/lib"]);
    }

    #[test]
    fn test_missing_repos_file() {
        let err = read_repos_file(Path::new("/nonexistent/repos.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::ReposFile { .. }));
    }

    #[test]
    fn test_from_args_merges_sources() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "octo/lib\nocto/app").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let mut cli = args(&["octo/app", "--repos-file", &path]);
        cli.repositories_env = Some("octo/cli, octo/lib".to_string());
        let config = BotConfig::from_args(&cli).unwrap();
        assert_eq!(config.repositories, vec!["octo/app", "octo/lib", "octo/cli"]);
    }

    #[test]
    fn test_from_args_requires_repositories() {
        let err = BotConfig::from_args(&args(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::NoRepositories));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        let err = BotConfig::from_args(&args(&["octo/app", "-v", "-q"])).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingOptions { .. }));
    }

    #[test]
    fn test_from_args_values() {
        let cli = args(&[
            "octo/app",
            "--api-url",
            "http://localhost:9000/",
            "--fork-timeout",
            "5",
            "--test-checkout",
            "/work",
            "--yes",
        ]);
        let config = BotConfig::from_args(&cli).unwrap();
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.fork_timeout, Duration::from_secs(5));
        assert!(config.auto_approve);
        assert_eq!(
            config.test,
            Some(TestConfig {
                checkout_root: PathBuf::from("/work"),
                script: "./run_tests.sh".to_string(),
            })
        );
        assert_eq!(config.log_directive(), "reqbump=info");
    }

    #[test]
    fn test_blank_token_is_dropped() {
        let mut cli = args(&["octo/app"]);
        cli.token = Some("  ".to_string());
        assert!(BotConfig::from_args(&cli).unwrap().token.is_none());
    }

    #[test]
    fn test_requirement_parser_deny_list() {
        let config =
            BotConfig::from_args(&args(&["octo/app", "--skip-package", "Django"])).unwrap();
        let parser = config.requirement_parser();
        assert!(parser.is_skipped_name("django"));
        assert!(parser.is_skipped_name("os"));

        let config = BotConfig::from_args(&args(&["octo/app", "--no-default-skips"])).unwrap();
        assert!(!config.requirement_parser().is_skipped_name("os"));
    }
}
