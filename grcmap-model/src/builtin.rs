//! Built-in GRC type table.

use crate::metadata::{QueryConstraint, TypeCategory, TypeMetadata};

/// Built-in governance types, all snapshotable.
pub const GOVERNANCE_TYPES: &[&str] = &[
    "Contract",
    "Control",
    "Objective",
    "Policy",
    "Regulation",
    "Requirement",
    "Risk",
    "Standard",
    "Threat",
];

/// Built-in scope types, all snapshotable.
pub const SCOPE_TYPES: &[&str] = &[
    "AccessGroup",
    "DataAsset",
    "Facility",
    "KeyReport",
    "Market",
    "Metric",
    "OrgGroup",
    "Process",
    "Product",
    "ProductGroup",
    "Project",
    "System",
    "TechnologyEnvironment",
    "Vendor",
];

pub(crate) fn builtin_types() -> Vec<TypeMetadata> {
    let mut types = vec![
        TypeMetadata::new("Program", TypeCategory::Programs),
        TypeMetadata::new("Audit", TypeCategory::Audit)
            .snapshot_parent()
            .with_constraint(QueryConstraint::Unlocked),
        TypeMetadata::new("Assessment", TypeCategory::Audit).audit_scope(),
        TypeMetadata::new("AssessmentTemplate", TypeCategory::Audit).audit_scope(),
        TypeMetadata::new("Issue", TypeCategory::Audit).audit_scope(),
        TypeMetadata::new("Person", TypeCategory::Entities).with_display("Person", "People"),
        TypeMetadata::new("Document", TypeCategory::Entities),
        TypeMetadata::new("Evidence", TypeCategory::Entities)
            .with_display("Evidence", "Evidence"),
        TypeMetadata::new("Workflow", TypeCategory::Other)
            .with_constraint(QueryConstraint::OwnedByCurrentUser),
    ];

    types.extend(
        GOVERNANCE_TYPES
            .iter()
            .map(|name| TypeMetadata::new(*name, TypeCategory::Governance).snapshotable()),
    );
    types.extend(
        SCOPE_TYPES
            .iter()
            .map(|name| TypeMetadata::new(*name, TypeCategory::Scope).snapshotable()),
    );
    types
}
