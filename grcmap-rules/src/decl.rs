//! Rule declarations as written by configuration, before resolution.

use crate::ruleset::{RuleField, TypeRuleSet};
use grcmap_types::TypeName;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A declaration for one type (or one named mixin).
///
/// Literal set fields are unioned on top of whatever the mixins contribute;
/// the scalar `mega` flag set here overrides any mixin's value.
#[derive(Debug, Clone, Default)]
pub struct RuleDecl {
    pub mixins: Vec<Mixin>,
    pub create: BTreeSet<TypeName>,
    pub map: BTreeSet<TypeName>,
    pub unmap: BTreeSet<TypeName>,
    pub external_map: BTreeSet<TypeName>,
    pub external_unmap: BTreeSet<TypeName>,
    pub indirect: BTreeSet<TypeName>,
    pub mega: Option<bool>,
}

impl RuleDecl {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mixin(mut self, mixin: impl Into<Mixin>) -> Self {
        self.mixins.push(mixin.into());
        self
    }

    #[must_use]
    pub fn with(mut self, field: RuleField, types: &[&str]) -> Self {
        self.field_mut(field)
            .extend(types.iter().map(|t| TypeName::from(*t)));
        self
    }

    #[must_use]
    pub fn create(self, types: &[&str]) -> Self {
        self.with(RuleField::Create, types)
    }

    #[must_use]
    pub fn map(self, types: &[&str]) -> Self {
        self.with(RuleField::Map, types)
    }

    #[must_use]
    pub fn unmap(self, types: &[&str]) -> Self {
        self.with(RuleField::Unmap, types)
    }

    #[must_use]
    pub fn external(self, types: &[&str]) -> Self {
        self.with(RuleField::ExternalMap, types)
            .with(RuleField::ExternalUnmap, types)
    }

    #[must_use]
    pub fn indirect(self, types: &[&str]) -> Self {
        self.with(RuleField::Indirect, types)
    }

    #[must_use]
    pub fn mega(mut self, mega: bool) -> Self {
        self.mega = Some(mega);
        self
    }

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
}

/// One entry of a declaration's mixin list.
#[derive(Debug, Clone)]
pub enum Mixin {
    /// Reference to another declaration by name.
    Named(String),
    /// An anonymous rule set merged in place.
    Inline(Box<RuleDecl>),
    /// A function that edits the accumulated rules directly.
    Transform(RuleTransform),
}

impl From<&str> for Mixin {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<RuleDecl> for Mixin {
    fn from(decl: RuleDecl) -> Self {
        Self::Inline(Box::new(decl))
    }
}

impl From<RuleTransform> for Mixin {
    fn from(transform: RuleTransform) -> Self {
        Self::Transform(transform)
    }
}

type TransformFn = dyn Fn(&mut RuleAccumulator) + Send + Sync;

/// A named rule-editing function.
#[derive(Clone)]
pub struct RuleTransform {
    name: String,
    apply: Arc<TransformFn>,
}

impl RuleTransform {
    pub fn new(
        name: impl Into<String>,
        apply: impl Fn(&mut RuleAccumulator) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn apply(&self, acc: &mut RuleAccumulator) {
        (self.apply)(acc);
    }
}

impl fmt::Debug for RuleTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleTransform")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Rules collected so far while resolving one declaration.
#[derive(Debug, Clone, Default)]
pub struct RuleAccumulator {
    pub(crate) rules: TypeRuleSet,
    pub(crate) mega: Option<bool>,
}

impl RuleAccumulator {
    pub fn insert(&mut self, field: RuleField, name: &str) {
        self.rules.field_mut(field).insert(TypeName::from(name));
    }

    pub fn remove(&mut self, field: RuleField, name: &str) {
        self.rules.field_mut(field).remove(name);
    }

    pub fn contains(&self, field: RuleField, name: &str) -> bool {
        self.rules.allows(field, name)
    }

    pub fn set_mega(&mut self, mega: bool) {
        self.mega = Some(mega);
    }

    /// Merges another resolved accumulator: sets union, a defined `mega`
    /// replaces the current one.
    pub(crate) fn merge(&mut self, other: &RuleAccumulator) {
        self.rules.union_with(&other.rules);
        if other.mega.is_some() {
            self.mega = other.mega;
        }
    }

    pub(crate) fn finish(mut self) -> TypeRuleSet {
        self.rules.mega = self.mega.unwrap_or(false);
        self.rules
    }
}
