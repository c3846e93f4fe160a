//! setup.py parser
//!
//! Only the literal list assigned to `install_requires` is scanned. Each
//! quoted item in the list is one entry; everything else in the file
//! (including `extras_require`) is ignored.

use crate::domain::ManifestKind;
use crate::error::ManifestError;
use crate::manifest::{ManifestEntry, ManifestParser};
use regex::Regex;
use std::sync::LazyLock;

static INSTALL_REQUIRES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)install_requires\s*=\s*\[(.*?)\]").unwrap());
static QUOTED_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"'([^']+)'|"([^"]+)""#).unwrap());

/// Parser for setup.py files
pub struct SetupPyParser;

impl ManifestParser for SetupPyParser {
    fn kind(&self) -> ManifestKind {
        ManifestKind::SetupPy
    }

    fn entries(&self, content: &str) -> Result<Vec<ManifestEntry>, ManifestError> {
        let Some(list) = INSTALL_REQUIRES_RE
            .captures(content)
            .and_then(|caps| caps.get(1))
        else {
            return Ok(Vec::new());
        };

        Ok(QUOTED_ITEM_RE
            .captures_iter(list.as_str())
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .filter_map(|m| {
                let raw = m.as_str();
                let item = raw.trim();
                let start = list.start() + m.start() + (raw.len() - raw.trim_start().len());
                (!item.is_empty()).then(|| ManifestEntry::verbatim(item, start))
            })
            .collect())
    }
}
