//! Proposed requirement rewrites, per line and per file

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single proposed rewrite of a requirement line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionUpdate {
    /// The original requirement text, verbatim
    pub old: String,
    /// The rewritten requirement text
    pub new: String,
}

impl VersionUpdate {
    /// Creates an update, returning `None` for a no-op rewrite
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Option<Self> {
        let old = old.into();
        let new = new.into();
        if old == new {
            return None;
        }
        Some(Self { old, new })
    }
}

impl fmt::Display for VersionUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.old, self.new)
    }
}

/// Manifest path mapped to its ordered updates
///
/// Files keep the order in which they were inserted, and files without
/// updates are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileUpdateSet {
    files: Vec<FileUpdates>,
}

/// Updates for a single manifest file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpdates {
    /// Manifest path relative to the repository root
    pub path: String,
    /// Updates in the order they were encountered while scanning
    pub updates: Vec<VersionUpdate>,
}

impl FileUpdateSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the updates for `path`; an empty list is dropped
    ///
    /// Inserting a path twice replaces the earlier entry in place.
    pub fn insert(&mut self, path: impl Into<String>, updates: Vec<VersionUpdate>) {
        let path = path.into();
        if updates.is_empty() {
            self.files.retain(|f| f.path != path);
            return;
        }
        match self.files.iter_mut().find(|f| f.path == path) {
            Some(existing) => existing.updates = updates,
            None => self.files.push(FileUpdates { path, updates }),
        }
    }

    /// Returns the updates recorded for `path`
    pub fn get(&self, path: &str) -> Option<&[VersionUpdate]> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.updates.as_slice())
    }

    /// Returns true if `path` has updates
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Iterates files in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &FileUpdates> {
        self.files.iter()
    }

    /// Paths in insertion order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    /// Number of files with updates
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no file has updates
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of updates across all files
    pub fn total_updates(&self) -> usize {
        self.files.iter().map(|f| f.updates.len()).sum()
    }
}

impl<'a> IntoIterator for &'a FileUpdateSet {
    type Item = &'a FileUpdates;
    type IntoIter = std::slice::Iter<'a, FileUpdates>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
