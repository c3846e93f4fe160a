//! Pipfile parser
//!
//! Handles entries in `[packages]` and `[dev-packages]`:
//! - String specs: `requests = "==2.25.0"`, `flask = "*"`
//! - Inline tables with a version key: `django = {version = ">=3.2", extras = ["argon2"]}`
//!
//! Entries without a version (git, path, editable) are ignored.

use crate::domain::ManifestKind;
use crate::error::ManifestError;
use crate::manifest::{ManifestEntry, ManifestParser};
use crate::parser::RequirementParser;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Tables whose keys are package names
const PACKAGE_SECTIONS: &[&str] = &["packages", "dev-packages"];

static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[{1,2}\s*([^\[\]\s]+)\s*\]{1,2}\s*(?:#.*)?$").unwrap());
static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*"?([A-Za-z0-9][A-Za-z0-9._\-]*)"?\s*=\s*"#).unwrap()
});
static STRING_SPEC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^"([^"]*)""#).unwrap());
static TABLE_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\{.*?\bversion\s*=\s*"([^"]*)""#).unwrap());

/// Parser for Pipfile manifests
pub struct PipfileParser;

/// Package name and the byte range of its quoted version spec within `line`
fn locate_spec(line: &str) -> Option<(&str, Range<usize>)> {
    let caps = ENTRY_RE.captures(line)?;
    let name = caps.get(1)?.as_str();
    let value_start = caps.get(0)?.end();
    let value = &line[value_start..];

    let spec = STRING_SPEC_RE
        .captures(value)
        .or_else(|| TABLE_VERSION_RE.captures(value))?
        .get(1)?;
    Some((name, value_start + spec.start()..value_start + spec.end()))
}

/// Pipfile spec to requirement line; `*` and empty mean unconstrained
fn requirement_line(name: &str, spec: &str) -> String {
    let spec = spec.trim();
    if spec.is_empty() || spec == "*" {
        name.to_string()
    } else if spec.starts_with(['<', '>', '=', '!', '~']) {
        format!("{}{}", name, spec)
    } else {
        format!("{}=={}", name, spec)
    }
}

impl ManifestParser for PipfileParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::Pipfile
    }

    fn entries(&self, content: &str) -> Result<Vec<ManifestEntry>, ManifestError> {
        toml::from_str::<toml::Table>(content)
            .map_err(|e| ManifestError::toml_parse_error("Pipfile", e.message()))?;

        let mut entries = Vec::new();
        let mut in_packages = false;
        let mut offset = 0;

        for raw in content.split_inclusive('\n') {
            let line_start = offset;
            offset += raw.len();
            let line = raw.trim_end_matches(['\n', '\r']);

            if let Some(caps) = SECTION_RE.captures(line) {
                let section = caps.get(1).map_or("", |m| m.as_str());
                in_packages = PACKAGE_SECTIONS.contains(&section);
                continue;
            }
            if !in_packages {
                continue;
            }

            let text = line.trim();
            if let Some((name, span)) = locate_spec(text) {
                let start = line_start + (line.len() - line.trim_start().len());
                let requirement = requirement_line(name, &text[span]);
                entries.push(ManifestEntry::new(text, requirement, start));
            }
        }

        Ok(entries)
    }

    fn render(&self, entry: &ManifestEntry, requirement: &str) -> String {
        let Some((_, span)) = locate_spec(&entry.text) else {
            return entry.text.clone();
        };
        let parsed = RequirementParser::without_default_skips().parse(requirement);
        let spec = if parsed.is_unconstrained() {
            "*"
        } else {
            parsed.specifier.as_str()
        };

        let mut rendered = entry.text.clone();
        rendered.replace_range(span, spec);
        rendered
    }
}
