use grcmap_types::TypeName;
use serde::{Deserialize, Serialize};

/// Grouping of domain types as shown in type selectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    Programs,
    Governance,
    Scope,
    Entities,
    Audit,
    #[default]
    Other,
}

/// A filter a type adds to every search that targets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryConstraint {
    /// Only objects that are not locked (archived) may be offered.
    Unlocked,
    /// Only objects owned by the acting user may be offered.
    OwnedByCurrentUser,
}

/// Static metadata for a single domain type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMetadata {
    pub name: TypeName,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub plural: String,
    #[serde(default)]
    pub category: TypeCategory,
    /// Instances can be frozen into snapshots when referenced from an audit.
    #[serde(default)]
    pub snapshotable: bool,
    /// Instances hold snapshots of their scope (e.g. Audit).
    #[serde(default)]
    pub snapshot_parent: bool,
    /// Instances live inside a snapshot parent's scope and see snapshots
    /// instead of live objects (e.g. Assessment).
    #[serde(default)]
    pub audit_scope: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<QueryConstraint>,
}

impl TypeMetadata {
    /// Metadata with display names derived from the type name.
    pub fn new(name: impl Into<TypeName>, category: TypeCategory) -> Self {
        let name = name.into();
        let display_name = humanize(name.as_str());
        let plural = pluralize(&display_name);
        Self {
            name,
            display_name,
            plural,
            category,
            snapshotable: false,
            snapshot_parent: false,
            audit_scope: false,
            constraint: None,
        }
    }

    /// Derives missing display names from the type name.
    pub(crate) fn fill_display_defaults(&mut self) {
        if self.display_name.is_empty() {
            self.display_name = humanize(self.name.as_str());
        }
        if self.plural.is_empty() {
            self.plural = pluralize(&self.display_name);
        }
    }

    #[must_use]
    pub fn snapshotable(mut self) -> Self {
        self.snapshotable = true;
        self
    }

    #[must_use]
    pub fn snapshot_parent(mut self) -> Self {
        self.snapshot_parent = true;
        self
    }

    #[must_use]
    pub fn audit_scope(mut self) -> Self {
        self.audit_scope = true;
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: QueryConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    #[must_use]
    pub fn with_display(mut self, display_name: &str, plural: &str) -> Self {
        self.display_name = display_name.to_string();
        self.plural = plural.to_string();
        self
    }
}

/// "DataAsset" -> "Data Asset".
fn humanize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() && prev_lower {
            out.push(' ');
        }
        prev_lower = c.is_lowercase();
        out.push(c);
    }
    out
}

fn pluralize(display: &str) -> String {
    if let Some(stem) = display.strip_suffix('y') {
        format!("{stem}ies")
    } else if display.ends_with('s') {
        format!("{display}es")
    } else {
        format!("{display}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humanize_splits_camel_case() {
        assert_eq!(humanize("DataAsset"), "Data Asset");
        assert_eq!(humanize("Control"), "Control");
        assert_eq!(humanize("OrgGroup"), "Org Group");
    }

    #[test]
    fn pluralize_rules() {
        assert_eq!(pluralize("Policy"), "Policies");
        assert_eq!(pluralize("Process"), "Processes");
        assert_eq!(pluralize("Control"), "Controls");
    }

    #[test]
    fn builder_flags() {
        let meta = TypeMetadata::new("Audit", TypeCategory::Audit)
            .snapshot_parent()
            .with_constraint(QueryConstraint::Unlocked);
        assert!(meta.snapshot_parent);
        assert!(!meta.snapshotable);
        assert_eq!(meta.constraint, Some(QueryConstraint::Unlocked));
        assert_eq!(meta.plural, "Audits");
    }
}
