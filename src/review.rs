//! Operator review of proposed changes
//!
//! The orchestrator asks a `Reviewer` twice:
//! - once per proposed `old -> new` change
//! - once per file, showing the final content that would be published
//!
//! `TerminalReviewer` prompts on a terminal; `AutoApprove` accepts everything
//! (`--yes`) and is also what headless runs and tests plug in.

use crate::domain::VersionUpdate;
use crate::error::ReviewError;
use colored::Colorize;
use std::io::{self, BufRead, Write};

/// Decides which proposed changes get published
pub trait Reviewer: Send {
    /// Approve or reject one change in `path`
    fn approve_update(&mut self, path: &str, update: &VersionUpdate) -> Result<bool, ReviewError>;

    /// Approve or reject publishing `path` with its final `content`
    fn approve_file(&mut self, path: &str, content: &str) -> Result<bool, ReviewError>;
}

/// Approves every change and every file
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

impl Reviewer for AutoApprove {
    fn approve_update(
        &mut self,
        _path: &str,
        _update: &VersionUpdate,
    ) -> Result<bool, ReviewError> {
        Ok(true)
    }

    fn approve_file(&mut self, _path: &str, _content: &str) -> Result<bool, ReviewError> {
        Ok(true)
    }
}

/// Operator answer to a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    No,
    All,
    Quit,
}

impl Answer {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => Some(Answer::Yes),
            // Publishing needs an explicit yes
            "" | "n" | "no" => Some(Answer::No),
            "a" | "all" => Some(Answer::All),
            "q" | "quit" => Some(Answer::Quit),
            _ => None,
        }
    }
}

/// Interactive reviewer reading answers line by line
pub struct TerminalReviewer<R, W> {
    input: R,
    output: W,
    approve_all: bool,
}

impl TerminalReviewer<io::BufReader<io::Stdin>, io::Stdout> {
    /// Reviewer on the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalReviewer<R, W> {
    /// Create a reviewer over arbitrary streams
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            approve_all: false,
        }
    }

    fn ask(&mut self, question: &str) -> Result<bool, ReviewError> {
        if self.approve_all {
            writeln!(
                self.output,
                "{}",
                "Auto-approving (previously selected 'all').".dimmed()
            )?;
            return Ok(true);
        }

        loop {
            write!(self.output, "{}", format!("{} [y/N/a/q]: ", question).bold())?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                // EOF: nobody is there to approve
                return Err(ReviewError::Cancelled);
            }

            match Answer::parse(&line) {
                Some(Answer::Yes) => return Ok(true),
                Some(Answer::No) => {
                    writeln!(self.output, "{}", "Skipped.".dimmed())?;
                    return Ok(false);
                }
                Some(Answer::All) => {
                    writeln!(
                        self.output,
                        "{}",
                        "Approving this and everything that follows.".green().bold()
                    )?;
                    self.approve_all = true;
                    return Ok(true);
                }
                Some(Answer::Quit) => {
                    writeln!(self.output, "{}", "Stopping review.".yellow())?;
                    return Err(ReviewError::Cancelled);
                }
                None => {
                    writeln!(
                        self.output,
                        "{}",
                        "Please answer with y(es), n(o), a(ll), or q(uit).".red()
                    )?;
                }
            }
        }
    }
}

impl<R, W> Reviewer for TerminalReviewer<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn approve_update(&mut self, path: &str, update: &VersionUpdate) -> Result<bool, ReviewError> {
        writeln!(self.output, "\n{} {}", "[change]".cyan().bold(), path.bold())?;
        writeln!(self.output, "  {} {}", "old:".dimmed(), update.old.red())?;
        writeln!(self.output, "  {} {}", "new:".dimmed(), update.new.green().bold())?;
        self.ask("Approve this change?")
    }

    fn approve_file(&mut self, path: &str, content: &str) -> Result<bool, ReviewError> {
        writeln!(
            self.output,
            "\n{} {}",
            "[final content]".cyan().bold(),
            path.bold()
        )?;
        for line in content.lines() {
            writeln!(self.output, "  {}", line)?;
        }
        self.ask("Approve this file for publishing?")
    }
}
