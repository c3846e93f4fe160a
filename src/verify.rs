//! Test-script verification of a published branch
//!
//! With a local checkout of each repository under a common root, the runner
//! fetches, checks out the update branch and runs the repository's test
//! script (`./run_tests.sh` by convention). A failing step stops the run
//! before the pull request is opened.

use crate::error::VerifyError;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info};

/// Default test script, run through `sh -c` inside the checkout
pub const DEFAULT_TEST_SCRIPT: &str = "./run_tests.sh";

/// Captured output of a successful test run
#[derive(Debug, Clone)]
pub struct TestReport {
    /// The script that was executed
    pub command: String,
    /// Standard output from the script
    pub stdout: String,
}

/// Trait for verifying an update branch before it is proposed
pub trait TestRunner: Send + Sync {
    /// Run the tests of `repository` (`owner/name`) on `branch`
    fn run_tests(&self, repository: &str, branch: &str) -> Result<TestReport, VerifyError>;
}

/// Runs git and the test script in `<checkout_root>/<repo name>`
#[derive(Debug, Clone)]
pub struct ScriptTestRunner {
    checkout_root: PathBuf,
    script: String,
}

impl ScriptTestRunner {
    /// Create a runner with the default script
    pub fn new(checkout_root: impl Into<PathBuf>) -> Self {
        Self {
            checkout_root: checkout_root.into(),
            script: DEFAULT_TEST_SCRIPT.to_string(),
        }
    }

    /// Use a different test script
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = script.into();
        self
    }

    /// Checkout directory for `owner/name`
    pub fn checkout_dir(&self, repository: &str) -> PathBuf {
        let name = repository.rsplit('/').next().unwrap_or(repository);
        self.checkout_root.join(name)
    }
}

/// Run one command, mapping spawn failures and non-zero exits
fn run_step(command: &mut Command, label: &str, working_dir: &Path) -> Result<Output, VerifyError> {
    debug!(command = label, dir = %working_dir.display(), "running");
    let output = command
        .current_dir(working_dir)
        .output()
        .map_err(|source| VerifyError::Spawn {
            command: label.to_string(),
            source,
        })?;

    if output.status.success() {
        Ok(output)
    } else {
        Err(VerifyError::Failed {
            command: label.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Run a shell snippet in `working_dir`
fn run_shell(script: &str, working_dir: &Path) -> Result<Output, VerifyError> {
    run_step(Command::new("sh").arg("-c").arg(script), script, working_dir)
}

impl TestRunner for ScriptTestRunner {
    fn run_tests(&self, repository: &str, branch: &str) -> Result<TestReport, VerifyError> {
        let dir = self.checkout_dir(repository);
        if !dir.is_dir() {
            return Err(VerifyError::CheckoutMissing { path: dir });
        }

        run_step(
            Command::new("git").args(["fetch", "--all"]),
            "git fetch --all",
            &dir,
        )?;
        run_step(
            Command::new("git").args(["checkout", branch]),
            &format!("git checkout {}", branch),
            &dir,
        )?;
        let output = run_shell(&self.script, &dir)?;
        info!(repo = repository, branch, "tests passed");

        Ok(TestReport {
            command: self.script.clone(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        })
    }
}
