//! Domain type identifiers.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Object name used for frozen copies of snapshotable entities.
pub const SNAPSHOT_TYPE: &str = "Snapshot";

/// Name of a domain type, e.g. `"Control"` or `"Audit"`.
///
/// Names are compared exactly; use [`TypeName::eq_ignore_case`] where the
/// comparison must tolerate casing differences (forbidden-pair lookups).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    /// Creates a type name without validation.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Parses a type name, rejecting empty or whitespace-padded input.
    pub fn parse(name: &str) -> crate::Result<Self> {
        if name.is_empty() || name.trim() != name || name.contains(char::is_whitespace) {
            return Err(crate::Error::InvalidTypeName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    /// The generic snapshot type name.
    pub fn snapshot() -> Self {
        Self(SNAPSHOT_TYPE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison.
    pub fn eq_ignore_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    /// Returns true if this is the generic snapshot type.
    pub fn is_snapshot(&self) -> bool {
        self.0 == SNAPSHOT_TYPE
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TypeName {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for TypeName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TypeName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for TypeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TypeName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TypeName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
