//! Requirement parsing
//!
//! Turns one line of manifest text into a [`Requirement`](crate::domain::Requirement).
//! The deny-list of names that are never treated as packages is explicit
//! and configurable through [`RequirementParser`].

mod requirement;

pub use requirement::{parse_requirement, RequirementParser, DEFAULT_SKIPPED_NAMES};
