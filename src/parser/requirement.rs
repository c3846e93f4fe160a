//! Requirement line parser
//!
//! Handles lines such as:
//! - Bare names: `flask`
//! - Constrained: `requests==2.25.0`, `django >= 3.2, < 5`
//! - Extras: `requests[socks]>=2.0`
//! - Markers: `tomli>=2.0; python_version < "3.11"`
//!
//! Comments, blank lines, pip options (`-e`, `--index-url`, ...), Python
//! keywords and deny-listed names all parse to the empty-name sentinel.

use crate::domain::Requirement;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Names that are never looked up in the registry by default
///
/// Standard-library modules that show up when requirement text was
/// scraped from source files. Matched against the whole package name,
/// case-insensitively.
pub const DEFAULT_SKIPPED_NAMES: &[&str] = &["sys", "os", "re", "time", "logging", "json"];

/// Line prefixes that mark pip options rather than packages
const CONTROL_PREFIXES: &[&str] = &["#", "--", "-e", "-r", "-c", "-i", "-f"];

/// Python keywords that start source lines, not requirements
const KEYWORDS: &[&str] = &["from", "import", "def"];

static REQUIREMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^<>=!~\s\[]+(?:\s*\[[^\]]*\])?)\s*([<>=!~].*)?").unwrap()
});
static OPERATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[<>=!~]+").unwrap());

/// Parser for single requirement lines with a configurable deny-list
#[derive(Debug, Clone)]
pub struct RequirementParser {
    /// Lowercased names that parse to the sentinel
    skipped_names: BTreeSet<String>,
}

impl Default for RequirementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequirementParser {
    /// Create a parser with the default deny-list
    pub fn new() -> Self {
        Self::without_default_skips().with_skipped_names(DEFAULT_SKIPPED_NAMES.iter().copied())
    }

    /// Create a parser with an empty deny-list
    pub fn without_default_skips() -> Self {
        Self {
            skipped_names: BTreeSet::new(),
        }
    }

    /// Add names to the deny-list
    pub fn with_skipped_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.skipped_names.extend(
            names
                .into_iter()
                .map(|n| n.as_ref().trim().to_lowercase())
                .filter(|n| !n.is_empty()),
        );
        self
    }

    /// Returns true if `name` is on the deny-list
    pub fn is_skipped_name(&self, name: &str) -> bool {
        self.skipped_names.contains(&name.to_lowercase())
    }

    /// The current deny-list, sorted
    pub fn skipped_names(&self) -> impl Iterator<Item = &str> {
        self.skipped_names.iter().map(String::as_str)
    }

    /// Parse one line into a requirement
    ///
    /// Never fails: anything unrecognizable becomes either the sentinel or
    /// a name-only requirement whose registry lookup will simply miss.
    pub fn parse(&self, line: &str) -> Requirement {
        let line = strip_quotes(line.trim()).trim();

        if line.is_empty() || is_control_line(line) {
            return Requirement::sentinel();
        }

        let (body, marker) = match line.split_once(';') {
            Some((body, marker)) => (body.trim(), Some(marker.trim())),
            None => (line, None),
        };

        let mut requirement = match REQUIREMENT_RE.captures(body) {
            Some(caps) => {
                let name = caps.get(1).map_or("", |m| m.as_str()).trim();
                let rest = &body[caps.get(1).map_or(0, |m| m.end())..];

                // Direct references (`pkg @ https://...`) are not version-managed
                if rest.trim_start().starts_with('@') {
                    return Requirement::sentinel();
                }

                let specifier = caps.get(2).map_or("", |m| m.as_str()).trim();
                let operator = OPERATOR_RE
                    .find(specifier)
                    .map_or("", |m| m.as_str())
                    .to_string();
                Requirement::new(name, specifier, operator)
            }
            None => Requirement::new(body, "", ""),
        };

        if self.is_skipped_name(requirement.package()) {
            return Requirement::sentinel();
        }

        if let Some(marker) = marker.filter(|m| !m.is_empty()) {
            requirement = requirement.with_marker(marker);
        }

        requirement
    }
}

/// Parse a line with the default deny-list
pub fn parse_requirement(line: &str) -> Requirement {
    RequirementParser::new().parse(line)
}

/// Removes one pair of surrounding quotes, keeping quotes inside markers
fn strip_quotes(line: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = line.strip_prefix(quote) {
            return inner.strip_suffix(quote).unwrap_or(inner);
        }
    }
    line
}

/// Returns true for comments, pip options and bare Python keywords
fn is_control_line(line: &str) -> bool {
    if CONTROL_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return true;
    }
    KEYWORDS.iter().any(|kw| {
        line.strip_prefix(kw)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}
