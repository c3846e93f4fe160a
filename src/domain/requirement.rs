//! Parsed requirement line types
//!
//! A requirement is the structured form of one manifest line such as
//! `requests>=2.25.0; python_version >= "3.8"`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Leading comparison operator of a version specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// `~=` (compatible release)
    Compatible,
    /// `===` (arbitrary equality)
    Arbitrary,
}

impl Operator {
    /// All operators, longest token first so prefix matching is unambiguous
    const BY_TOKEN_LEN: [Operator; 8] = [
        Operator::Arbitrary,
        Operator::Equal,
        Operator::NotEqual,
        Operator::GreaterOrEqual,
        Operator::LessOrEqual,
        Operator::Compatible,
        Operator::Greater,
        Operator::Less,
    ];

    /// Returns the textual token for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::Compatible => "~=",
            Operator::Arbitrary => "===",
        }
    }

    /// Splits a leading operator off `text`, returning the operator and the rest
    pub fn split_prefix(text: &str) -> Option<(Self, &str)> {
        Self::BY_TOKEN_LEN
            .iter()
            .copied()
            .find_map(|op| text.strip_prefix(op.as_str()).map(|rest| (op, rest)))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single parsed requirement
///
/// `name` is empty for the sentinel produced by comments, blank lines and
/// control directives; callers must discard those with [`Requirement::is_sentinel`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Requirement {
    /// Package identifier as written, including any `[extras]`
    pub name: String,
    /// Raw constraint text following the name (empty means unconstrained)
    pub specifier: String,
    /// Leading run of comparison symbols in `specifier`, verbatim
    pub operator: String,
    /// Environment marker after `;`, without the separator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

impl Requirement {
    /// Creates a requirement without a marker
    pub fn new(
        name: impl Into<String>,
        specifier: impl Into<String>,
        operator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            specifier: specifier.into(),
            operator: operator.into(),
            marker: None,
        }
    }

    /// The empty-name sentinel
    pub fn sentinel() -> Self {
        Self::default()
    }

    /// Attaches an environment marker
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Returns true if this is not a real requirement
    pub fn is_sentinel(&self) -> bool {
        self.name.is_empty()
    }

    /// Returns true if no version constraint was given
    pub fn is_unconstrained(&self) -> bool {
        self.specifier.is_empty()
    }

    /// Registry package name: `name` without any `[extras]` suffix
    pub fn package(&self) -> &str {
        match self.name.find('[') {
            Some(idx) => self.name[..idx].trim_end(),
            None => &self.name,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.specifier)?;
        if let Some(ref marker) = self.marker {
            write!(f, "; {}", marker)?;
        }
        Ok(())
    }
}
