//! Identifiers for the people, documents and exclusion lists actions operate on.

use std::fmt;

/// Server-side identifier of a Person entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonId(String);

/// Repository document identifier (photos are documents too).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocId(String);

impl PersonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<&str> for DocId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Exclusion lists that `show_excluded` can clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcludedKind {
    Pictures,
    Authorship,
}

impl ExcludedKind {
    /// Tag sent as the `etype` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            ExcludedKind::Pictures => "pictures",
            ExcludedKind::Authorship => "authorship",
        }
    }
}

impl fmt::Display for ExcludedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
