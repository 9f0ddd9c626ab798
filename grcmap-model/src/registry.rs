//! The type registry: an immutable table of [`TypeMetadata`] keyed by name.

use crate::builtin::builtin_types;
use crate::error::RegistryResult;
use crate::loader::load_or_fallback;
use crate::metadata::{QueryConstraint, TypeCategory, TypeMetadata};
use grcmap_types::TypeName;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Per-type metadata, built once and shared by reference.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeName, TypeMetadata>,
    /// Declaration order, for stable iteration.
    order: Vec<TypeName>,
}

impl TypeRegistry {
    /// Builds a registry from declarations. Later duplicates of an already
    /// declared name are ignored with a warning.
    pub fn from_types(types: impl IntoIterator<Item = TypeMetadata>) -> Self {
        let mut registry = Self::default();
        for meta in types {
            if registry.types.contains_key(&meta.name) {
                warn!("Duplicate type declaration for {}, keeping the first", meta.name);
                continue;
            }
            registry.order.push(meta.name.clone());
            registry.types.insert(meta.name.clone(), meta);
        }
        registry
    }

    /// The built-in GRC type table.
    pub fn builtin() -> Self {
        Self::from_types(builtin_types())
    }

    /// Parses a registry from TOML (`[[types]]` tables).
    pub fn from_toml_str(contents: &str) -> RegistryResult<Self> {
        let file: RegistryFile = toml::from_str(contents)?;
        let mut types = Vec::with_capacity(file.types.len());
        for mut decl in file.types {
            TypeName::parse(decl.name.as_str())?;
            decl.fill_display_defaults();
            types.push(decl);
        }
        Ok(Self::from_types(types))
    }

    /// Loads a registry file, falling back to [`TypeRegistry::builtin`] with a
    /// warning when the file is missing or malformed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        load_or_fallback(path.as_ref(), "type registry", Self::from_toml_str, Self::builtin)
    }

    pub fn get(&self, name: &str) -> Option<&TypeMetadata> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates metadata in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeMetadata> {
        self.order.iter().filter_map(|name| self.types.get(name))
    }

    /// Display name, or the raw type name when the type is not declared.
    pub fn display_name(&self, name: &str) -> String {
        match self.lookup(name) {
            Some(meta) => meta.display_name.clone(),
            None => name.to_string(),
        }
    }

    /// Plural display name, or the raw type name when the type is not declared.
    pub fn plural(&self, name: &str) -> String {
        match self.lookup(name) {
            Some(meta) => meta.plural.clone(),
            None => name.to_string(),
        }
    }

    pub fn category(&self, name: &str) -> Option<TypeCategory> {
        self.lookup(name).map(|meta| meta.category)
    }

    /// Type names in a category, sorted by display name.
    pub fn types_in(&self, category: TypeCategory) -> Vec<TypeName> {
        let mut found: Vec<&TypeMetadata> =
            self.iter().filter(|meta| meta.category == category).collect();
        found.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        found.into_iter().map(|meta| meta.name.clone()).collect()
    }

    /// All snapshotable type names in declaration order.
    pub fn snapshotable_types(&self) -> Vec<TypeName> {
        self.iter()
            .filter(|meta| meta.snapshotable)
            .map(|meta| meta.name.clone())
            .collect()
    }

    pub fn is_snapshotable(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|meta| meta.snapshotable)
    }

    pub fn is_snapshot_parent(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|meta| meta.snapshot_parent)
    }

    pub fn is_audit_scope(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|meta| meta.audit_scope)
    }

    /// Returns true for the generic snapshot object name.
    pub fn is_snapshot_model(&self, name: &str) -> bool {
        name == grcmap_types::SNAPSHOT_TYPE
    }

    /// Whether searching `child` from `parent` must go through snapshots:
    /// the child is snapshotable and the parent either owns snapshots or
    /// lives inside a snapshot parent's scope.
    pub fn is_snapshot_related(&self, parent: &str, child: &str) -> bool {
        self.is_snapshotable(child)
            && (self.is_snapshot_parent(parent) || self.is_audit_scope(parent))
    }

    pub fn constraint(&self, name: &str) -> Option<QueryConstraint> {
        self.lookup(name).and_then(|meta| meta.constraint)
    }

    fn lookup(&self, name: &str) -> Option<&TypeMetadata> {
        let found = self.types.get(name);
        if found.is_none() && !self.is_snapshot_model(name) {
            debug!("No metadata declared for type {}", name);
        }
        found
    }
}

/// Raw TOML structure matching the registry file format.
#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default)]
    types: Vec<TypeMetadata>,
}
