//! PEP 440 version specifiers
//!
//! Handles clauses:
//! - Exact and excluded: `==1.2.3`, `!=1.2.3`, with prefix wildcards `==1.2.*`
//! - Comparison: `>=1.2`, `<=1.2`, `>1.2`, `<1.2`
//! - Compatible release: `~=1.2.3`
//! - Arbitrary equality: `===foobar`
//! - Comma-separated sets: `>=1.0, <2.0`

use super::version::Version;
use crate::domain::Operator;
use crate::error::VersionError;
use std::fmt;

/// Version operand of a clause
#[derive(Debug, Clone)]
enum Operand {
    /// A concrete version
    Version(Version),
    /// Release prefix of a `==X.*` / `!=X.*` clause
    Prefix(Version),
    /// Raw string for `===`
    Arbitrary(String),
}

/// A single specifier clause such as `>=1.2`
#[derive(Debug, Clone)]
pub struct Specifier {
    operator: Operator,
    operand: Operand,
    raw: String,
}

impl Specifier {
    /// Parse one clause
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let raw = input.trim();
        let (operator, rest) = Operator::split_prefix(raw)
            .ok_or_else(|| VersionError::invalid_specifier(raw, "missing operator"))?;
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(VersionError::invalid_specifier(raw, "missing version"));
        }

        let operand = match operator {
            Operator::Arbitrary => Operand::Arbitrary(rest.to_string()),
            Operator::Equal | Operator::NotEqual if rest.ends_with(".*") => {
                let prefix = Version::parse(&rest[..rest.len() - 2])?;
                if prefix.local.is_some() {
                    return Err(VersionError::invalid_specifier(
                        raw,
                        "wildcard with local version",
                    ));
                }
                Operand::Prefix(prefix)
            }
            _ => {
                let version = Version::parse(rest)?;
                if version.local.is_some()
                    && !matches!(operator, Operator::Equal | Operator::NotEqual)
                {
                    return Err(VersionError::invalid_specifier(
                        raw,
                        "local version only allowed with == and !=",
                    ));
                }
                if operator == Operator::Compatible && version.release.len() < 2 {
                    return Err(VersionError::invalid_specifier(
                        raw,
                        "~= needs at least two release segments",
                    ));
                }
                Operand::Version(version)
            }
        };

        Ok(Self {
            operator,
            operand,
            raw: raw.to_string(),
        })
    }

    /// The clause operator
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns true if the clause itself names a pre-release
    pub fn names_prerelease(&self) -> bool {
        match self.operand {
            Operand::Version(ref v) | Operand::Prefix(ref v) => v.is_prerelease(),
            Operand::Arbitrary(_) => false,
        }
    }

    /// Returns true if `candidate` satisfies this clause
    pub fn contains(&self, candidate: &Version) -> bool {
        match (&self.operator, &self.operand) {
            (Operator::Arbitrary, Operand::Arbitrary(raw)) => {
                candidate.to_string().eq_ignore_ascii_case(raw)
            }
            (Operator::Equal, Operand::Prefix(prefix)) => prefix_matches(prefix, candidate),
            (Operator::NotEqual, Operand::Prefix(prefix)) => !prefix_matches(prefix, candidate),
            (Operator::Equal, Operand::Version(spec)) => exact_matches(spec, candidate),
            (Operator::NotEqual, Operand::Version(spec)) => !exact_matches(spec, candidate),
            (Operator::GreaterOrEqual, Operand::Version(spec)) => candidate.public() >= *spec,
            (Operator::LessOrEqual, Operand::Version(spec)) => candidate.public() <= *spec,
            (Operator::Greater, Operand::Version(spec)) => {
                let candidate = candidate.public();
                // `>1.7` does not admit `1.7.post1`
                candidate > *spec
                    && !(candidate.is_postrelease()
                        && !spec.is_postrelease()
                        && candidate.base() == spec.base())
            }
            (Operator::Less, Operand::Version(spec)) => {
                let candidate = candidate.public();
                // `<1.7` does not admit `1.7rc1`
                candidate < *spec
                    && !(candidate.is_prerelease()
                        && !spec.is_prerelease()
                        && candidate.base() == spec.base())
            }
            (Operator::Compatible, Operand::Version(spec)) => {
                let prefix = Version {
                    release: spec.release[..spec.release.len() - 1].to_vec(),
                    ..spec.base()
                };
                candidate.public() >= *spec && prefix_matches(&prefix, candidate)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// `==` semantics: local labels are ignored unless the clause names one
fn exact_matches(spec: &Version, candidate: &Version) -> bool {
    if spec.local.is_some() {
        candidate == spec
    } else {
        candidate.public() == *spec
    }
}

/// `==X.*` semantics: epoch equal and release padded to the prefix length matches
fn prefix_matches(prefix: &Version, candidate: &Version) -> bool {
    if candidate.epoch != prefix.epoch {
        return false;
    }
    let mut release = candidate.release.clone();
    if release.len() < prefix.release.len() {
        release.resize(prefix.release.len(), 0);
    }
    if release[..prefix.release.len()] != prefix.release[..] {
        return false;
    }
    // A prefix that itself carries a pre/post/dev suffix must match it too
    match (prefix.pre, prefix.post, prefix.dev) {
        (None, None, None) => true,
        _ => {
            candidate.pre == prefix.pre
                && candidate.post == prefix.post
                && candidate.dev == prefix.dev
        }
    }
}

/// A comma-separated set of clauses, all of which must hold
#[derive(Debug, Clone, Default)]
pub struct SpecifierSet {
    specifiers: Vec<Specifier>,
}

impl SpecifierSet {
    /// Parse a set; an empty string yields the unconstrained set
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let specifiers = input
            .split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .map(Specifier::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specifiers })
    }

    /// The parsed clauses
    pub fn specifiers(&self) -> &[Specifier] {
        &self.specifiers
    }

    /// Returns true if there are no clauses
    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// Returns true if `candidate` satisfies every clause
    ///
    /// Pre-releases are only admitted when some clause names a pre-release.
    pub fn contains(&self, candidate: &Version) -> bool {
        if candidate.is_prerelease() && !self.specifiers.iter().any(|s| s.names_prerelease()) {
            return false;
        }
        self.specifiers.iter().all(|s| s.contains(candidate))
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.specifiers.iter().map(|s| s.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}
