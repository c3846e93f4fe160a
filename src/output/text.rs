//! Text output formatter for human-readable display
//!
//! This module provides:
//! - One status line per repository, colored by outcome
//! - Proposed changes for dry runs, grouped per file
//! - Discovered imports for `--scan-imports`
//! - A closing summary with pull-request and failure counts

use crate::domain::{FileUpdateSet, RepoOutcome, RepoReport, RunReport};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    /// Short status label for an outcome
    fn status_label(&self, outcome: &RepoOutcome) -> String {
        let (label, painted) = match outcome {
            RepoOutcome::PullRequest { .. } => ("PR", "PR".green().bold()),
            RepoOutcome::NoUpdates => ("up to date", "up to date".dimmed()),
            RepoOutcome::Rejected => ("rejected", "rejected".yellow()),
            RepoOutcome::DryRun { .. } => ("dry-run", "dry-run".cyan()),
            RepoOutcome::Imports { .. } => ("imports", "imports".cyan()),
            RepoOutcome::Failed { .. } => ("failed", "failed".red().bold()),
        };
        if self.color {
            format!("[{}]", painted)
        } else {
            format!("[{}]", label)
        }
    }

    /// Whether a repository line is shown at this verbosity
    fn is_shown(&self, outcome: &RepoOutcome) -> bool {
        match self.verbosity {
            Verbosity::Quiet => matches!(
                outcome,
                RepoOutcome::PullRequest { .. } | RepoOutcome::Failed { .. }
            ),
            Verbosity::Normal | Verbosity::Verbose => true,
        }
    }

    /// Write proposed changes grouped per file
    fn format_updates(
        &self,
        updates: &FileUpdateSet,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        for file in updates {
            if self.color {
                writeln!(writer, "    {}", file.path.bold())?;
            } else {
                writeln!(writer, "    {}", file.path)?;
            }
            for update in &file.updates {
                if self.color {
                    writeln!(
                        writer,
                        "      {} {} {}",
                        update.old.dimmed(),
                        "→".dimmed(),
                        update.new.bright_white().bold()
                    )?;
                } else {
                    writeln!(writer, "      {} -> {}", update.old, update.new)?;
                }
            }
        }
        Ok(())
    }

    /// Write the closing summary line
    fn format_summary(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let total = report.repositories.len();
        let prs = report.pull_request_count();
        let failures = report.failure_count();
        let repos = if total == 1 { "repository" } else { "repositories" };

        if self.color {
            let failures_display = if failures > 0 {
                failures.to_string().red().bold()
            } else {
                failures.to_string().dimmed()
            };
            writeln!(
                writer,
                "{} {}: {} pull request(s), {} failed",
                total.to_string().bold(),
                repos,
                prs.to_string().green(),
                failures_display
            )
        } else {
            writeln!(
                writer,
                "{} {}: {} pull request(s), {} failed",
                total, repos, prs, failures
            )
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        for repo in &report.repositories {
            self.format_repository(repo, writer)?;
        }

        if !report.repositories.is_empty() {
            writeln!(writer)?;
        }
        self.format_summary(report, writer)
    }

    fn format_repository(&self, repo: &RepoReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if !self.is_shown(&repo.outcome) {
            return Ok(());
        }

        let label = self.status_label(&repo.outcome);
        let name = if self.color {
            repo.repository.bold().to_string()
        } else {
            repo.repository.clone()
        };

        match &repo.outcome {
            RepoOutcome::PullRequest { url } => writeln!(writer, "{} {} {}", label, name, url),
            RepoOutcome::NoUpdates => writeln!(writer, "{} {}", label, name),
            RepoOutcome::Rejected => writeln!(writer, "{} {}", label, name),
            RepoOutcome::DryRun { updates } => {
                writeln!(
                    writer,
                    "{} {} ({} change(s) in {} file(s))",
                    label,
                    name,
                    updates.total_updates(),
                    updates.len()
                )?;
                self.format_updates(updates, writer)
            }
            RepoOutcome::Imports { modules } => {
                writeln!(writer, "{} {} ({} module(s))", label, name, modules.len())?;
                for module in modules {
                    writeln!(writer, "    {}", module)?;
                }
                Ok(())
            }
            RepoOutcome::Failed { message } => writeln!(writer, "{} {}: {}", label, name, message),
        }
    }
}
