//! Field path matching against `routing_path` patterns.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// RoutingPathError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RoutingPathError {
    #[error("[index.routing_path] must not be empty")]
    Empty,

    #[error("[index.routing_path] contains an empty pattern")]
    EmptyPattern,

    #[error("[index.routing_path] pattern [{0}] may only use [*] as its last character")]
    InteriorWildcard(String),
}

///
/// Pattern
/// A literal dotted field name, or a literal prefix followed by a trailing `*`.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Pattern {
    Exact(String),
    Prefix(String),
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self, RoutingPathError> {
        if raw.is_empty() {
            return Err(RoutingPathError::EmptyPattern);
        }

        match raw.strip_suffix('*') {
            Some(prefix) if prefix.contains('*') => {
                Err(RoutingPathError::InteriorWildcard(raw.to_string()))
            }
            Some(prefix) => Ok(Self::Prefix(prefix.to_string())),
            None if raw.contains('*') => Err(RoutingPathError::InteriorWildcard(raw.to_string())),
            None => Ok(Self::Exact(raw.to_string())),
        }
    }

    #[must_use]
    pub fn matches(&self, field_path: &str) -> bool {
        match self {
            Self::Exact(name) => name == field_path,
            Self::Prefix(prefix) => field_path.starts_with(prefix.as_str()),
        }
    }

    /// The literal field path for an exact pattern.
    #[must_use]
    pub fn exact(&self) -> Option<&str> {
        match self {
            Self::Exact(name) => Some(name),
            Self::Prefix(_) => None,
        }
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(name) => f.write_str(name),
            Self::Prefix(prefix) => write!(f, "{prefix}*"),
        }
    }
}

impl TryFrom<String> for Pattern {
    type Error = RoutingPathError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Pattern> for String {
    fn from(pattern: Pattern) -> Self {
        pattern.to_string()
    }
}

/// True when any pattern matches the dotted field path.
#[must_use]
pub fn matches(patterns: &[Pattern], field_path: &str) -> bool {
    patterns.iter().any(|pattern| pattern.matches(field_path))
}

///
/// RoutingPath
/// The ordered, non-empty pattern set fixed at index creation.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RoutingPath {
    patterns: Vec<Pattern>,
}

impl RoutingPath {
    pub fn new<I, S>(raw: I) -> Result<Self, RoutingPathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = raw
            .into_iter()
            .map(|s| Pattern::parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if patterns.is_empty() {
            return Err(RoutingPathError::Empty);
        }

        Ok(Self { patterns })
    }

    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    #[must_use]
    pub fn matches(&self, field_path: &str) -> bool {
        matches(&self.patterns, field_path)
    }

    /// True when a literal pattern names exactly this path.
    #[must_use]
    pub fn names_exactly(&self, field_path: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.exact() == Some(field_path))
    }

    pub fn exact_paths(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().filter_map(Pattern::exact)
    }
}

impl Display for RoutingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .patterns
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "[{joined}]")
    }
}
