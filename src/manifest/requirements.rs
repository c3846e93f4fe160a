//! requirements.txt / requirements.lock parser
//!
//! One requirement per line. Inline comments are cut at the first `#`,
//! and blank or comment-only lines yield no entry. Control lines such as
//! `-e .` are still returned; the requirement parser turns them into sentinels.
//!
//! A trailing `\` continuation (pip-compile `--generate-hashes` output) stays
//! in the entry text but not in the requirement, and is kept on render.

use crate::domain::ManifestKind;
use crate::error::ManifestError;
use crate::manifest::{ManifestEntry, ManifestParser};
use regex::Regex;
use std::sync::LazyLock;

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[^#\n]+").unwrap());

/// Parser for line-based requirement files
pub struct RequirementsParser {
    kind: ManifestKind,
}

impl RequirementsParser {
    /// Create a parser for `kind`, which should be line based
    pub fn new(kind: ManifestKind) -> Self {
        Self { kind }
    }
}

impl ManifestParser for RequirementsParser {
    fn kind(&self) -> ManifestKind {
        self.kind
    }

    fn entries(&self, content: &str) -> Result<Vec<ManifestEntry>, ManifestError> {
        let mut entries = Vec::new();
        for m in LINE_RE.find_iter(content) {
            let raw = m.as_str();
            let text = raw.trim();
            if text.is_empty() {
                continue;
            }

            let start = m.start() + (raw.len() - raw.trim_start().len());
            let requirement = text.strip_suffix('\\').map_or(text, str::trim_end);
            entries.push(ManifestEntry::new(text, requirement, start));
        }
        Ok(entries)
    }

    fn render(&self, entry: &ManifestEntry, requirement: &str) -> String {
        // Keep the continuation suffix (` \`) the requirement was cut from
        let suffix = entry
            .text
            .strip_prefix(entry.requirement.as_str())
            .unwrap_or_default();
        format!("{}{}", requirement, suffix)
    }
}
