//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of the run report
//! - Summary counts alongside the per-repository outcomes

use crate::domain::{RepoReport, RunReport};
use crate::output::{OutputFormatter, Verbosity};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects whether uneventful repositories are listed
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput<'a> {
    /// Summary statistics
    summary: JsonSummary,
    /// Per-repository outcomes
    repositories: Vec<&'a RepoReport>,
}

/// JSON representation of summary statistics
#[derive(Serialize)]
struct JsonSummary {
    /// Number of repositories processed
    repositories: usize,
    /// Number of pull requests opened
    pull_requests: usize,
    /// Number of failed repositories
    failures: usize,
}

impl JsonFormatter {
    fn build<'a>(&self, report: &'a RunReport) -> JsonOutput<'a> {
        let repositories = report
            .repositories
            .iter()
            .filter(|r| {
                self.verbosity != Verbosity::Quiet
                    || r.outcome.pull_request_url().is_some()
                    || r.outcome.is_failure()
            })
            .collect();

        JsonOutput {
            summary: JsonSummary {
                repositories: report.repositories.len(),
                pull_requests: report.pull_request_count(),
                failures: report.failure_count(),
            },
            repositories,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = self.build(report);
        serde_json::to_writer_pretty(&mut *writer, &output)?;
        writeln!(writer)
    }

    fn format_repository(&self, repo: &RepoReport, writer: &mut dyn Write) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, repo)?;
        writeln!(writer)
    }
}
