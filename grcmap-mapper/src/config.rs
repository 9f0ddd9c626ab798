//! Mapper configuration.

use crate::error::MapperResult;
use grcmap_model::{TypeRegistry, load_or_fallback};
use grcmap_query::Paging;
use grcmap_rules::RuleGraph;
use grcmap_types::{MegaRelation, SNAPSHOT_TYPE, TypeName};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for a [`crate::Mapper`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Results per search page.
    pub page_size: u32,
    /// Mega direction for objects with no backend relation and no override.
    pub default_relation: MegaRelation,
    /// Object name snapshot searches are rewritten to.
    pub snapshot_type: String,
    /// Type registry TOML; built-in types when unset.
    pub registry_path: Option<PathBuf>,
    /// Rules TOML; built-in rules when unset.
    pub rules_path: Option<PathBuf>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            default_relation: MegaRelation::Child,
            snapshot_type: SNAPSHOT_TYPE.to_string(),
            registry_path: None,
            rules_path: None,
        }
    }
}

impl MapperConfig {
    pub fn from_toml_str(contents: &str) -> MapperResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads config from a TOML file, falling back to defaults when the file
    /// is missing or invalid.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        load_or_fallback(path.as_ref(), "mapper config", Self::from_toml_str, Self::default)
    }

    /// First page of a search.
    pub fn paging(&self) -> Paging {
        Paging::new(1, self.page_size.max(1))
    }

    pub fn snapshot_type(&self) -> TypeName {
        TypeName::from(self.snapshot_type.as_str())
    }

    pub fn registry(&self) -> TypeRegistry {
        match &self.registry_path {
            Some(path) => TypeRegistry::load_from(path),
            None => TypeRegistry::builtin(),
        }
    }

    pub fn rule_graph(&self) -> RuleGraph {
        match &self.rules_path {
            Some(path) => RuleGraph::load_from(path),
            None => RuleGraph::builtin(),
        }
    }
}
