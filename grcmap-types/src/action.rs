//! Verbs: permission actions, staged join actions and mega relations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An action checked against the permission oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Update,
    Create,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Update => "update",
            Self::Create => "create",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a staged join should be applied on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinAction {
    Map,
    Unmap,
}

impl JoinAction {
    /// The action that cancels this one out.
    pub fn opposite(self) -> Self {
        match self {
            Self::Map => Self::Unmap,
            Self::Unmap => Self::Map,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Unmap => "unmap",
        }
    }
}

impl fmt::Display for JoinAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinAction {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "map" => Ok(Self::Map),
            "unmap" => Ok(Self::Unmap),
            other => Err(crate::Error::UnknownLiteral {
                kind: "join action",
                value: other.to_string(),
            }),
        }
    }
}

/// Logical direction of a mega mapping, relative to the base instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MegaRelation {
    Parent,
    Child,
}

impl MegaRelation {
    /// `true` when the selected object becomes a child of the base instance.
    pub fn is_child(self) -> bool {
        matches!(self, Self::Child)
    }

    pub fn from_is_child(is_child: bool) -> Self {
        if is_child { Self::Child } else { Self::Parent }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
        }
    }
}

impl fmt::Display for MegaRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MegaRelation {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(Self::Parent),
            "child" => Ok(Self::Child),
            other => Err(crate::Error::UnknownLiteral {
                kind: "mega relation",
                value: other.to_string(),
            }),
        }
    }
}
