//! Update judgment logic for requirements
//!
//! This module provides:
//! - A PEP 440 version model and specifier sets
//! - `needs_update`: whether a latest version escapes the current specifier
//! - `render_requirement`: the rewritten requirement line
//! - `UpdateJudge`: both of the above bound to a configured parser

mod specifier;
mod version;

pub use specifier::{Specifier, SpecifierSet};
pub use version::{is_prerelease_version, PreRelease, Version};

use crate::domain::{Operator, VersionUpdate};
use crate::parser::RequirementParser;

/// Decide whether `latest` warrants rewriting a requirement with `specifier`
///
/// - Empty specifier: always true.
/// - `~=X`: true when `latest > X` and shares X's major.minor.
/// - Otherwise: true when `latest` is not contained in the specifier set.
///
/// Unparsable specifiers or versions fail open (true).
pub fn needs_update(specifier: &str, latest: &str) -> bool {
    let specifier = specifier.trim();
    if specifier.is_empty() {
        return true;
    }

    let Ok(latest) = Version::parse(latest) else {
        return true;
    };
    let Ok(set) = SpecifierSet::parse(specifier) else {
        return true;
    };

    if let [clause] = set.specifiers() {
        if clause.operator() == Operator::Compatible {
            let pinned = specifier
                .strip_prefix(Operator::Compatible.as_str())
                .map(str::trim)
                .and_then(|v| Version::parse(v).ok());
            return match pinned {
                Some(pinned) => latest > pinned && latest.major_minor() == pinned.major_minor(),
                None => true,
            };
        }
    }

    !set.contains(&latest)
}

/// Rewrite `line` so that it requests `latest`
///
/// The original operator is kept; a line without one is pinned with `==`.
/// Environment markers are carried over.
pub fn render_requirement(line: &str, latest: &str) -> String {
    UpdateJudge::default().render(line, latest)
}

/// Update judgment engine bound to a requirement parser
#[derive(Debug, Clone, Default)]
pub struct UpdateJudge {
    parser: RequirementParser,
}

impl UpdateJudge {
    /// Create a judge using `parser` to re-read requirement lines
    pub fn new(parser: RequirementParser) -> Self {
        Self { parser }
    }

    /// The parser used for requirement lines
    pub fn parser(&self) -> &RequirementParser {
        &self.parser
    }

    /// See [`needs_update`]
    pub fn needs_update(&self, specifier: &str, latest: &str) -> bool {
        needs_update(specifier, latest)
    }

    /// Render the updated line; sentinels are returned unchanged
    pub fn render(&self, line: &str, latest: &str) -> String {
        let requirement = self.parser.parse(line);
        if requirement.is_sentinel() {
            return line.to_string();
        }

        let mut rendered = match requirement.operator.as_str() {
            "~=" => format!("{}~={}", requirement.name, latest),
            "" => format!("{}=={}", requirement.name, latest),
            op => format!("{}{}{}", requirement.name, op, latest),
        };
        if let Some(ref marker) = requirement.marker {
            rendered.push_str("; ");
            rendered.push_str(marker);
        }
        rendered
    }

    /// Judge one requirement line against the latest version
    ///
    /// Returns `None` for sentinels, lines already satisfied by `latest`,
    /// and rewrites that would not change the text.
    pub fn judge(&self, line: &str, latest: &str) -> Option<VersionUpdate> {
        let requirement = self.parser.parse(line);
        if requirement.is_sentinel() {
            return None;
        }
        if !self.needs_update(&requirement.specifier, latest) {
            return None;
        }
        VersionUpdate::new(line.trim(), self.render(line, latest))
    }
}
