//! reqbump - dependency-update bot CLI
//!
//! For each configured GitHub repository, this tool:
//! - Reads the Python manifests at the repository root
//! - Looks up the latest stable release of each requirement on PyPI
//! - Lets an operator review every proposed change
//! - Publishes the approved changes as a pull request

use clap::Parser;
use reqbump::cli::CliArgs;
use reqbump::config::BotConfig;
use reqbump::host::GitHubHost;
use reqbump::http::{HttpClient, DEFAULT_USER_AGENT};
use reqbump::orchestrator::{Orchestrator, OrchestratorConfig};
use reqbump::output::create_formatter;
use reqbump::publish::ForkWait;
use reqbump::registry::PyPIAdapter;
use reqbump::review::{AutoApprove, Reviewer, TerminalReviewer};
use reqbump::update::UpdateJudge;
use reqbump::verify::ScriptTestRunner;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    let config = match BotConfig::from_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);

    match run(config).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Structured logs on stderr; `RUST_LOG` wins over the verbosity flags
fn init_logging(config: &BotConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(config: BotConfig) -> anyhow::Result<ExitCode> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        repositories = config.repositories.len(),
        dry_run = config.dry_run,
        "starting reqbump"
    );
    if config.token.is_none() && !config.dry_run && !config.scan_imports {
        warn!("no GitHub token configured; publication will fail");
    }

    let registry_client = HttpClient::with_config(config.http_timeout, DEFAULT_USER_AGENT)?;
    let host_client = HttpClient::with_config(config.http_timeout, DEFAULT_USER_AGENT)?
        .with_token(config.token.clone())
        .with_max_retries(config.retries);

    let index = PyPIAdapter::with_base_url(registry_client, config.registry_url.clone());
    let host = GitHubHost::with_base_url(host_client, config.api_url.clone());
    let reviewer: Box<dyn Reviewer> = if config.auto_approve {
        Box::new(AutoApprove)
    } else {
        Box::new(TerminalReviewer::stdio())
    };

    let orchestrator_config = OrchestratorConfig {
        branch_prefix: config.branch_prefix.clone(),
        fork_wait: ForkWait::new(config.fork_timeout),
        dry_run: config.dry_run,
        scan_imports: config.scan_imports,
        show_progress: !config.quiet && io::stderr().is_terminal(),
    };

    let mut orchestrator = Orchestrator::new(
        Box::new(host),
        Box::new(index),
        reviewer,
        UpdateJudge::new(config.requirement_parser()),
        orchestrator_config,
    );
    if let Some(ref test) = config.test {
        orchestrator = orchestrator.with_test_runner(Box::new(
            ScriptTestRunner::new(&test.checkout_root).with_script(test.script.clone()),
        ));
    }

    let report = orchestrator.run(&config.repositories).await;

    let formatter = create_formatter(config.output.clone());
    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    if report.has_failures() {
        // Partial success - some repositories failed
        Ok(ExitCode::from(2))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
