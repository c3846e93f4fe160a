//! Manifest content extraction and rewriting
//!
//! This module provides functionality to:
//! - Extract requirement entries from each recognized manifest kind
//! - Map a rewritten requirement back into the manifest's own syntax
//! - Apply approved updates to file content in scan order

mod pipfile;
mod requirements;
mod setup_py;
mod writer;

pub use pipfile::PipfileParser;
pub use requirements::RequirementsParser;
pub use setup_py::SetupPyParser;
pub use writer::apply_updates;

use crate::domain::ManifestKind;
use crate::error::ManifestError;
use std::ops::Range;

/// One dependency declaration found in a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Text of the declaration exactly as it appears in the file
    pub text: String,
    /// The declaration expressed as a requirement line (`name<spec>`)
    pub requirement: String,
    /// Byte range of `text` within the scanned content
    pub span: Range<usize>,
}

impl ManifestEntry {
    /// Entry for the `text` found at byte offset `start`
    pub fn new(text: impl Into<String>, requirement: impl Into<String>, start: usize) -> Self {
        let text = text.into();
        Self {
            span: start..start + text.len(),
            requirement: requirement.into(),
            text,
        }
    }

    /// Entry whose file text already is a requirement line
    pub fn verbatim(text: impl Into<String>, start: usize) -> Self {
        let text = text.into();
        Self::new(text.clone(), text, start)
    }
}

/// Trait for extracting and rewriting manifest entries
pub trait ManifestParser: Send + Sync {
    /// Returns the manifest kind this parser handles
    fn kind(&self) -> ManifestKind;

    /// Extract dependency declarations in file order
    fn entries(&self, content: &str) -> Result<Vec<ManifestEntry>, ManifestError>;

    /// Express a rewritten requirement line in this manifest's syntax
    fn render(&self, _entry: &ManifestEntry, requirement: &str) -> String {
        requirement.to_string()
    }
}

/// Get a manifest parser for the specified kind
pub fn get_parser(kind: ManifestKind) -> Box<dyn ManifestParser> {
    match kind {
        ManifestKind::RequirementsTxt | ManifestKind::RequirementsLock => {
            Box::new(RequirementsParser::new(kind))
        }
        ManifestKind::SetupPy => Box::new(SetupPyParser),
        ManifestKind::Pipfile => Box::new(PipfileParser),
    }
}
