//! Top-level import discovery in Python sources
//!
//! Collects the first dotted component of `import x` and `from x import y`
//! statements that start a line. Deny-listed names are dropped.

use crate::parser::RequirementParser;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^import\s+(\w+)|^from\s+(\w+)").unwrap());

/// Module names imported at the top of `content`, sorted
pub fn scan_imports(content: &str, parser: &RequirementParser) -> BTreeSet<String> {
    IMPORT_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
        .filter(|name| !parser.is_skipped_name(name))
        .map(str::to_string)
        .collect()
}

/// Returns true for paths scanned for imports
pub fn is_python_source(path: &str) -> bool {
    path.ends_with(".py")
}
