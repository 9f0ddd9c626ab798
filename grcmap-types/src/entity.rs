//! Entity references and the reference-or-type-name union used at API boundaries.

use crate::name::TypeName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Server-assigned object identifier.
pub type ObjectId = i64;

/// Identifier of a security context an object lives in.
pub type ContextId = i64;

/// Reference to a persisted domain object.
///
/// Equality and hashing only consider `(id, entity_type)`; the snapshot and
/// context fields ride along as metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub entity_type: TypeName,
    /// Type of the live object this snapshot was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_type: Option<TypeName>,
    /// Id of the live object this snapshot was taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<ContextId>,
}

impl EntityRef {
    pub fn new(id: ObjectId, entity_type: impl Into<TypeName>) -> Self {
        Self {
            id,
            entity_type: entity_type.into(),
            child_type: None,
            child_id: None,
            context_id: None,
        }
    }

    /// A snapshot reference (`type = "Snapshot"`) pointing at a live object.
    pub fn snapshot_of(
        id: ObjectId,
        child_type: impl Into<TypeName>,
        child_id: ObjectId,
    ) -> Self {
        Self {
            id,
            entity_type: TypeName::snapshot(),
            child_type: Some(child_type.into()),
            child_id: Some(child_id),
            context_id: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context_id: ContextId) -> Self {
        self.context_id = Some(context_id);
        self
    }

    /// Returns true if this reference denotes a snapshot of another object.
    pub fn is_snapshot(&self) -> bool {
        self.child_type.is_some()
    }

    /// The type rules should be evaluated against: the snapshotted object's
    /// type for snapshots, the reference's own type otherwise.
    pub fn effective_type(&self) -> &TypeName {
        self.child_type.as_ref().unwrap_or(&self.entity_type)
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.entity_type == other.entity_type
    }
}

impl Eq for EntityRef {}

impl Hash for EntityRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.entity_type.hash(state);
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.child_type, self.child_id) {
            (Some(child_type), Some(child_id)) => write!(
                f,
                "{}#{} ({}#{})",
                self.entity_type, self.id, child_type, child_id
            ),
            _ => write!(f, "{}#{}", self.entity_type, self.id),
        }
    }
}

/// Either a concrete object, an unsaved draft of a type, or just a type name.
///
/// Evaluator entry points accept this union and normalize it once instead of
/// sniffing argument shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityLike {
    /// A persisted object.
    Ref(EntityRef),
    /// A new object that has no server identity yet.
    Draft(TypeName),
    /// A bare type name with no instance behind it.
    Type(TypeName),
}

impl EntityLike {
    /// The type rules apply to, with snapshots resolved to their child type.
    pub fn effective_type(&self) -> &TypeName {
        match self {
            Self::Ref(entity) => entity.effective_type(),
            Self::Draft(name) | Self::Type(name) => name,
        }
    }

    /// The persisted object, if any.
    pub fn entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Ref(entity) => Some(entity),
            _ => None,
        }
    }

    /// Returns true for drafts that have not been saved yet.
    pub fn is_draft(&self) -> bool {
        matches!(self, Self::Draft(_))
    }

    /// Returns true for persisted objects and drafts, false for bare type names.
    pub fn is_instance(&self) -> bool {
        !matches!(self, Self::Type(_))
    }

    pub fn is_snapshot(&self) -> bool {
        self.entity().is_some_and(EntityRef::is_snapshot)
    }
}

impl From<EntityRef> for EntityLike {
    fn from(entity: EntityRef) -> Self {
        Self::Ref(entity)
    }
}

impl From<&EntityRef> for EntityLike {
    fn from(entity: &EntityRef) -> Self {
        Self::Ref(entity.clone())
    }
}

impl From<TypeName> for EntityLike {
    fn from(name: TypeName) -> Self {
        Self::Type(name)
    }
}

impl From<&str> for EntityLike {
    fn from(name: &str) -> Self {
        Self::Type(TypeName::from(name))
    }
}
