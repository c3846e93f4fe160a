//! Core domain models for reqbump
//!
//! This module contains the fundamental types used throughout the application:
//! - Parsed requirement lines and their comparison operators
//! - Proposed rewrites and the per-file update map
//! - Recognized manifest kinds
//! - Per-repository outcomes and the batch report

mod manifest_kind;
mod outcome;
mod requirement;
mod version_update;

pub use manifest_kind::ManifestKind;
pub use outcome::{RepoOutcome, RepoReport, RunReport};
pub use requirement::{Operator, Requirement};
pub use version_update::{FileUpdateSet, FileUpdates, VersionUpdate};
