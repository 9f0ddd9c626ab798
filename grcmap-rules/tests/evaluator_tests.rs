use grcmap_rules::{
    CompatibilityEvaluator, ForbiddenPairs, MapOptions, RuleDecl, RuleGraph, StaticPermissions,
    RELATIONSHIP_TYPE,
};
use grcmap_types::{Action, EntityLike, EntityRef, TypeName};
use proptest::prelude::*;
use std::sync::Arc;

fn builtin() -> CompatibilityEvaluator {
    CompatibilityEvaluator::allow_all(Arc::new(RuleGraph::builtin()))
}

fn obj(id: i64, ty: &str) -> EntityLike {
    EntityRef::new(id, ty).into()
}

fn with_permissions(perms: StaticPermissions) -> CompatibilityEvaluator {
    CompatibilityEvaluator::new(Arc::new(RuleGraph::builtin()), Arc::new(perms))
}

// ── Rule lookups ─────────────────────────────────────────────────

#[test]
fn mappable_pair_is_allowed() {
    let ev = builtin();
    assert!(ev.can_map(&obj(1, "Program"), &obj(2, "Control"), &MapOptions::default()));
    assert!(ev.can_map(&"Program".into(), &"Control".into(), &MapOptions::default()));
}

#[test]
fn reverse_rule_direction_is_accepted() {
    // Audit lists snapshotables; Control does not list Audit.
    let ev = builtin();
    assert!(ev.can_map(&obj(1, "Control"), &obj(2, "Audit"), &MapOptions::default()));
}

#[test]
fn unrelated_pair_is_refused() {
    let ev = builtin();
    assert!(!ev.can_map(&obj(1, "Person"), &obj(2, "Evidence"), &MapOptions::default()));
    assert!(!ev.can_unmap(&obj(1, "Person"), &obj(2, "Evidence")));
}

#[test]
fn snapshot_refs_use_child_type() {
    let ev = builtin();
    let snapshot: EntityLike = EntityRef::snapshot_of(50, "Control", 3).into();
    assert!(ev.can_map(&obj(1, "Assessment"), &snapshot, &MapOptions::default()));
}

// ── Forbidden pairs ──────────────────────────────────────────────

#[test]
fn one_way_forbidden_pair_is_asymmetric() {
    let ev = builtin();
    let issue = obj(1, "Issue");
    let audit = obj(2, "Audit");

    assert!(!ev.can_map(&issue, &audit, &MapOptions::default()));
    assert!(ev.can_map(&audit, &issue, &MapOptions::default()));
    assert!(ev.can_unmap(&issue, &audit));
}

#[test]
fn unmap_context_lifts_one_way_check() {
    let ev = builtin();
    assert!(ev.can_map(&obj(1, "Issue"), &obj(2, "Audit"), &MapOptions::unmap_context()));
}

#[test]
fn one_way_check_is_case_insensitive() {
    let graph = RuleGraph::build(
        vec![(TypeName::from("issue"), RuleDecl::new().map(&["audit"]))],
        ForbiddenPairs::new().one_way("Issue", "Audit"),
    );
    let ev = CompatibilityEvaluator::allow_all(Arc::new(graph));
    assert!(!ev.can_map(&"issue".into(), &"audit".into(), &MapOptions::default()));
}

#[test]
fn two_way_forbidden_pair_is_refused_both_ways() {
    let graph = RuleGraph::build(
        vec![
            (TypeName::from("Audit"), RuleDecl::new().map(&["Program"]).unmap(&["Program"])),
            (TypeName::from("Program"), RuleDecl::new().map(&["Audit"]).unmap(&["Audit"])),
        ],
        ForbiddenPairs::new().two_way("Audit", "Program"),
    );
    let ev = CompatibilityEvaluator::allow_all(Arc::new(graph));
    assert!(!ev.can_map(&obj(1, "Audit"), &obj(2, "Program"), &MapOptions::default()));
    assert!(!ev.can_map(&obj(2, "Program"), &obj(1, "Audit"), &MapOptions::default()));
    assert!(!ev.can_unmap(&obj(2, "Program"), &obj(1, "Audit")));
}

// ── Snapshot scope ───────────────────────────────────────────────

#[test]
fn snapshot_scope_vetoes_map_but_not_unmap() {
    let ev = builtin();
    let opts = MapOptions::in_snapshot_scope();
    assert!(!ev.can_map(&obj(1, "Program"), &obj(2, "Control"), &opts));
    assert!(ev.can_unmap(&obj(1, "Program"), &obj(2, "Control")));
}

// ── Permissions ──────────────────────────────────────────────────

#[test]
fn source_update_permission_required() {
    let ev = with_permissions(StaticPermissions::new().with_type(Action::Update, "Control"));
    assert!(!ev.can_map(&obj(1, "Program"), &obj(2, "Control"), &MapOptions::default()));

    let ev = with_permissions(
        StaticPermissions::new()
            .with_type(Action::Update, "Control")
            .with_object(Action::Update, "Program", 1),
    );
    assert!(ev.can_map(&obj(1, "Program"), &obj(2, "Control"), &MapOptions::default()));
}

#[test]
fn draft_source_skips_source_permission() {
    let ev = with_permissions(StaticPermissions::new().with_type(Action::Update, "Control"));
    let draft = EntityLike::Draft("Program".into());
    assert!(ev.can_map(&draft, &obj(2, "Control"), &MapOptions::default()));
}

#[test]
fn target_needs_update_or_scoped_create() {
    let ev = with_permissions(StaticPermissions::new().with_type(Action::Update, "Program"));
    let bare_target = obj(2, "Control");
    assert!(!ev.can_map(&obj(1, "Program"), &bare_target, &MapOptions::default()));

    let scoped: EntityLike = EntityRef::new(2, "Control").with_context(77).into();
    assert!(!ev.can_map(&obj(1, "Program"), &scoped, &MapOptions::default()));

    let ev = with_permissions(
        StaticPermissions::new()
            .with_type(Action::Update, "Program")
            .with_context(Action::Create, RELATIONSHIP_TYPE, 77),
    );
    assert!(ev.can_map(&obj(1, "Program"), &scoped, &MapOptions::default()));
    assert!(!ev.can_map(&obj(1, "Program"), &bare_target, &MapOptions::default()));
}

#[test]
fn type_name_target_needs_no_target_permission() {
    let ev = with_permissions(StaticPermissions::new().with_type(Action::Update, "Program"));
    assert!(ev.can_map(&obj(1, "Program"), &"Control".into(), &MapOptions::default()));
}

// ── External management ──────────────────────────────────────────

#[test]
fn externally_managed_pairs() {
    let ev = builtin();
    assert!(ev.is_externally_managed("Control", "Risk"));
    assert!(ev.is_externally_mapped("System", "Threat"));
    assert!(ev.is_externally_unmapped("System", "Threat"));
    assert!(!ev.is_externally_managed("Program", "Risk"));
    assert!(!ev.is_externally_managed("Control", "Objective"));
}

// ── Type selector & mega ─────────────────────────────────────────

#[test]
fn mappable_targets_filters_and_sorts() {
    let ev = builtin();
    let targets = ev.mappable_targets(&obj(1, "Issue"), &MapOptions::default());
    assert!(targets.contains(&TypeName::from("Assessment")));
    assert!(!targets.contains(&TypeName::from("Audit")));
    let mut sorted = targets.clone();
    sorted.sort();
    assert_eq!(targets, sorted);
}

#[test]
fn mappable_targets_empty_in_snapshot_scope() {
    let ev = builtin();
    assert!(
        ev.mappable_targets(&obj(1, "Program"), &MapOptions::in_snapshot_scope())
            .is_empty()
    );
}

#[test]
fn mega_mapping_requires_same_mega_type() {
    let ev = builtin();
    assert!(ev.is_mega_mapping(&obj(1, "Program"), &obj(2, "Program")));
    assert!(!ev.is_mega_mapping(&obj(1, "Program"), &obj(2, "Control")));
    assert!(!ev.is_mega_mapping(&obj(1, "Control"), &obj(2, "Control")));
}

// ── Properties ───────────────────────────────────────────────────

fn builtin_types() -> Vec<&'static str> {
    vec![
        "Program", "Audit", "Assessment", "Issue", "Control", "Objective", "Risk", "System",
        "Process", "Vendor", "Document", "Workflow", "Person", "Evidence",
    ]
}

proptest! {
    /// Anything listed in a type's map set is mappable absent vetoes.
    #[test]
    fn listed_map_targets_are_mappable(source_idx in 0usize..14, id in 1i64..1000) {
        let ev = builtin();
        let graph = RuleGraph::builtin();
        let source = builtin_types()[source_idx];
        for target in graph.mappable_types(source) {
            let forbidden = graph.forbidden().is_one_way_forbidden(source, target.as_str())
                || graph.forbidden().is_two_way_forbidden(source, target.as_str());
            if forbidden {
                continue;
            }
            prop_assert!(ev.can_map(
                &obj(id, source),
                &obj(id + 1, target.as_str()),
                &MapOptions::default()
            ));
        }
    }

    /// Unmap never depends on the snapshot-scope flag or one-way pairs.
    #[test]
    fn can_unmap_is_at_least_as_permissive(a in 0usize..14, b in 0usize..14) {
        let ev = builtin();
        let types = builtin_types();
        let source = obj(1, types[a]);
        let target = obj(2, types[b]);
        let graph = RuleGraph::builtin();
        let map_listed = graph.allows(types[a], grcmap_rules::RuleField::Map, types[b]);
        let unmap_listed = graph.allows(types[a], grcmap_rules::RuleField::Unmap, types[b]);
        if map_listed && unmap_listed && ev.can_map(&source, &target, &MapOptions::default()) {
            prop_assert!(ev.can_unmap(&source, &target));
        }
    }
}

#[test]
fn every_one_way_pair_is_asymmetric() {
    let graph = RuleGraph::builtin();
    let ev = builtin();
    for (source, target) in graph.forbidden().one_way_pairs() {
        let s = obj(1, source.as_str());
        let t = obj(2, target.as_str());
        assert!(!ev.can_map(&s, &t, &MapOptions::default()));
        assert!(ev.can_unmap(&s, &t));
    }
}
