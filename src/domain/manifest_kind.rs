//! Recognized manifest file kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Manifest formats scanned for requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestKind {
    /// `requirements.txt`
    RequirementsTxt,
    /// `requirements.lock`
    RequirementsLock,
    /// `setup.py` (only the `install_requires` list)
    SetupPy,
    /// `Pipfile`
    Pipfile,
}

impl ManifestKind {
    /// Returns all kinds in scan order
    pub fn all() -> &'static [ManifestKind] {
        &[
            ManifestKind::RequirementsTxt,
            ManifestKind::RequirementsLock,
            ManifestKind::SetupPy,
            ManifestKind::Pipfile,
        ]
    }

    /// Returns the file name looked up at the repository root
    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestKind::RequirementsTxt => "requirements.txt",
            ManifestKind::RequirementsLock => "requirements.lock",
            ManifestKind::SetupPy => "setup.py",
            ManifestKind::Pipfile => "Pipfile",
        }
    }

    /// Finds the kind for a file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.file_name() == name)
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
