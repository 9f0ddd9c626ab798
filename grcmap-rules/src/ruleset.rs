use grcmap_types::TypeName;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// One of the set-valued fields of a rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleField {
    Create,
    Map,
    Unmap,
    ExternalMap,
    ExternalUnmap,
    Indirect,
}

impl RuleField {
    pub const ALL: [RuleField; 6] = [
        Self::Create,
        Self::Map,
        Self::Unmap,
        Self::ExternalMap,
        Self::ExternalUnmap,
        Self::Indirect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Map => "map",
            Self::Unmap => "unmap",
            Self::ExternalMap => "external_map",
            Self::ExternalUnmap => "external_unmap",
            Self::Indirect => "indirect",
        }
    }
}

impl fmt::Display for RuleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flattened rules for one type, after mixin resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeRuleSet {
    pub create: BTreeSet<TypeName>,
    pub map: BTreeSet<TypeName>,
    pub unmap: BTreeSet<TypeName>,
    pub external_map: BTreeSet<TypeName>,
    pub external_unmap: BTreeSet<TypeName>,
    pub indirect: BTreeSet<TypeName>,
    /// Same-type mappings carry an explicit parent/child direction.
    pub mega: bool,
}

impl TypeRuleSet {
    pub fn field(&self, field: RuleField) -> &BTreeSet<TypeName> {
        match field {
            RuleField::Create => &self.create,
            RuleField::Map => &self.map,
            RuleField::Unmap => &self.unmap,
            RuleField::ExternalMap => &self.external_map,
            RuleField::ExternalUnmap => &self.external_unmap,
            RuleField::Indirect => &self.indirect,
        }
    }

    pub fn field_mut(&mut self, field: RuleField) -> &mut BTreeSet<TypeName> {
        match field {
            RuleField::Create => &mut self.create,
            RuleField::Map => &mut self.map,
            RuleField::Unmap => &mut self.unmap,
            RuleField::ExternalMap => &mut self.external_map,
            RuleField::ExternalUnmap => &mut self.external_unmap,
            RuleField::Indirect => &mut self.indirect,
        }
    }

    pub fn allows(&self, field: RuleField, target: &str) -> bool {
        self.field(field).contains(target)
    }

    /// Unions every set-valued field of `other` into `self`.
    pub fn union_with(&mut self, other: &TypeRuleSet) {
        for field in RuleField::ALL {
            self.field_mut(field)
                .extend(other.field(field).iter().cloned());
        }
    }

    pub fn is_empty(&self) -> bool {
        RuleField::ALL.iter().all(|f| self.field(*f).is_empty()) && !self.mega
    }
}
