//! Built-in GRC mapping rules.

use crate::decl::{RuleAccumulator, RuleDecl, RuleTransform};
use crate::forbidden::ForbiddenPairs;
use crate::ruleset::RuleField;
use grcmap_model::{GOVERNANCE_TYPES, SCOPE_TYPES};
use grcmap_types::TypeName;

/// Types whose relationships are owned by the external risk system.
const EXTERNALLY_MANAGED: &[&str] = &["Risk", "Threat"];

fn snapshotable() -> Vec<&'static str> {
    GOVERNANCE_TYPES.iter().chain(SCOPE_TYPES).copied().collect()
}

/// Snapshotable objects reach audits and assessments only through snapshots.
fn audit_scoped() -> RuleTransform {
    RuleTransform::new("audit_scoped", |acc: &mut RuleAccumulator| {
        for name in ["Audit", "Assessment", "Issue"] {
            acc.insert(RuleField::Indirect, name);
        }
        acc.remove(RuleField::Map, "Audit");
        acc.remove(RuleField::Unmap, "Audit");
    })
}

pub(crate) fn builtin_declarations() -> Vec<(TypeName, RuleDecl)> {
    let related: Vec<&str> = snapshotable()
        .into_iter()
        .chain(["Program", "Issue", "Document", "Workflow"])
        .collect();
    let snapshots = snapshotable();

    let mut decls = vec![
        (
            "related_object",
            RuleDecl::new().map(&related).unmap(&related),
        ),
        (
            "Program",
            RuleDecl::new()
                .mixin("related_object")
                .map(&["Program"])
                .unmap(&["Program"])
                .create(&["Audit"])
                .mega(true),
        ),
        (
            "Audit",
            RuleDecl::new()
                .map(&snapshots)
                .map(&["Issue"])
                .unmap(&["Issue"])
                .create(&["Assessment", "AssessmentTemplate", "Issue"])
                .indirect(&["Program"]),
        ),
        (
            "Assessment",
            RuleDecl::new()
                .map(&snapshots)
                .map(&["Issue", "Evidence"])
                .unmap(&snapshots)
                .unmap(&["Issue", "Evidence"])
                .indirect(&["Audit"]),
        ),
        ("AssessmentTemplate", RuleDecl::new().indirect(&["Audit"])),
        (
            "Issue",
            RuleDecl::new()
                .mixin("related_object")
                .map(&["Audit", "Assessment"])
                .unmap(&["Audit", "Assessment"]),
        ),
        (
            "Workflow",
            RuleDecl::new().map(&snapshots).unmap(&snapshots),
        ),
        ("Document", RuleDecl::new().mixin("related_object")),
        ("Evidence", RuleDecl::new().indirect(&["Assessment", "Audit"])),
        ("Person", RuleDecl::new().indirect(&related)),
    ];

    for name in GOVERNANCE_TYPES.iter().chain(SCOPE_TYPES) {
        let mut decl = RuleDecl::new()
            .mixin("related_object")
            .mixin(audit_scoped());
        if *name == "Control" {
            decl = decl.map(&["Control"]).unmap(&["Control"]);
        }
        if !EXTERNALLY_MANAGED.contains(name) {
            decl = decl.external(EXTERNALLY_MANAGED);
        }
        decls.push((*name, decl));
    }

    decls
        .into_iter()
        .map(|(name, decl)| (TypeName::from(name), decl))
        .collect()
}

pub(crate) fn builtin_forbidden() -> ForbiddenPairs {
    ForbiddenPairs::new()
        .one_way("Issue", "Audit")
        .two_way("Audit", "Program")
}
