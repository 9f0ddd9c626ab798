use grcmap_model::TypeRegistry;
use grcmap_rules::{
    ForbiddenPairs, Mixin, RuleDecl, RuleDiagnostic, RuleField, RuleGraph, RuleTransform,
};
use grcmap_types::TypeName;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn set(names: &[&str]) -> BTreeSet<TypeName> {
    names.iter().map(|n| TypeName::from(*n)).collect()
}

fn graph(decls: Vec<(&str, RuleDecl)>) -> RuleGraph {
    RuleGraph::build(
        decls
            .into_iter()
            .map(|(name, decl)| (TypeName::from(name), decl)),
        ForbiddenPairs::new(),
    )
}

// ── Literal declarations ─────────────────────────────────────────

#[test]
fn literal_rules_without_mixins() {
    let g = graph(vec![("T", RuleDecl::new().map(&["X", "Y"]).unmap(&["X"]))]);
    let rules = g.resolve("T");
    assert_eq!(rules.map, set(&["X", "Y"]));
    assert_eq!(rules.unmap, set(&["X"]));
    assert!(rules.create.is_empty());
    assert!(rules.external_map.is_empty());
    assert!(!rules.mega);
}

#[test]
fn undeclared_type_resolves_empty() {
    let g = graph(vec![("T", RuleDecl::new().map(&["X"]))]);
    assert!(g.resolve("Nope").is_empty());
    assert!(!g.contains("Nope"));
    assert!(g.mappable_types("Nope").is_empty());
}

// ── Mixins ───────────────────────────────────────────────────────

#[test]
fn named_mixin_sets_are_unioned() {
    let g = graph(vec![
        ("base", RuleDecl::new().map(&["A", "B"]).create(&["C"])),
        ("T", RuleDecl::new().mixin("base").map(&["D"])),
    ]);
    let rules = g.resolve("T");
    assert_eq!(rules.map, set(&["A", "B", "D"]));
    assert_eq!(rules.create, set(&["C"]));
}

#[test]
fn mixins_resolve_recursively_in_order() {
    let g = graph(vec![
        ("root", RuleDecl::new().map(&["A"]).mega(true)),
        ("middle", RuleDecl::new().mixin("root").unmap(&["B"])),
        ("other", RuleDecl::new().mega(false)),
        ("T", RuleDecl::new().mixin("middle").mixin("other")),
    ]);
    let rules = g.resolve("T");
    assert_eq!(rules.map, set(&["A"]));
    assert_eq!(rules.unmap, set(&["B"]));
    // Later mixin overrides the earlier scalar.
    assert!(!rules.mega);
    assert!(g.resolve("middle").mega);
}

#[test]
fn direct_scalar_overrides_mixin() {
    let g = graph(vec![
        ("base", RuleDecl::new().mega(true)),
        ("T", RuleDecl::new().mixin("base").mega(false)),
        ("U", RuleDecl::new().mixin("base")),
    ]);
    assert!(!g.resolve("T").mega);
    assert!(g.resolve("U").mega);
}

#[test]
fn inline_mixin_merges() {
    let g = graph(vec![(
        "T",
        RuleDecl::new()
            .mixin(RuleDecl::new().map(&["A"]).indirect(&["Z"]))
            .map(&["B"]),
    )]);
    let rules = g.resolve("T");
    assert_eq!(rules.map, set(&["A", "B"]));
    assert_eq!(rules.indirect, set(&["Z"]));
}

#[test]
fn transform_mixin_mutates_accumulator() {
    let strip_a = RuleTransform::new("strip_a", |acc| {
        acc.remove(RuleField::Map, "A");
        acc.insert(RuleField::Create, "New");
    });
    let g = graph(vec![
        ("base", RuleDecl::new().map(&["A", "B"])),
        ("T", RuleDecl::new().mixin("base").mixin(strip_a)),
    ]);
    let rules = g.resolve("T");
    assert_eq!(rules.map, set(&["B"]));
    assert_eq!(rules.create, set(&["New"]));
}

#[test]
fn transform_runs_before_literal_fields() {
    let strip_a = RuleTransform::new("strip_a", |acc| acc.remove(RuleField::Map, "A"));
    let g = graph(vec![("T", RuleDecl::new().mixin(strip_a).map(&["A"]))]);
    assert_eq!(g.resolve("T").map, set(&["A"]));
}

#[test]
fn transform_can_set_mega() {
    let make_mega = RuleTransform::new("make_mega", |acc| acc.set_mega(true));
    let g = graph(vec![("T", RuleDecl::new().mixin(make_mega))]);
    assert!(g.resolve("T").mega);
}

#[test]
fn transform_debug_shows_name() {
    let t = RuleTransform::new("audit_scoped", |_| {});
    assert!(format!("{:?}", Mixin::from(t)).contains("audit_scoped"));
}

// ── Self references ──────────────────────────────────────────────

#[test]
fn inherited_self_reference_is_dropped() {
    let g = graph(vec![
        ("related", RuleDecl::new().map(&["T", "U"]).unmap(&["T", "U"])),
        ("T", RuleDecl::new().mixin("related")),
        ("U", RuleDecl::new().mixin("related").map(&["U"])),
    ]);
    assert_eq!(g.resolve("T").map, set(&["U"]));
    assert_eq!(g.resolve("T").unmap, set(&["U"]));
    // Explicitly self-referential map survives, unmap does not.
    assert_eq!(g.resolve("U").map, set(&["T", "U"]));
    assert_eq!(g.resolve("U").unmap, set(&["T"]));
}

// ── Degraded configurations ──────────────────────────────────────

#[test]
fn unknown_mixin_is_skipped_with_diagnostic() {
    let g = graph(vec![(
        "T",
        RuleDecl::new().mixin("missing").map(&["A"]),
    )]);
    assert_eq!(g.resolve("T").map, set(&["A"]));
    assert_eq!(
        g.diagnostics(),
        &[RuleDiagnostic::UnknownMixin {
            owner: "T".into(),
            mixin: "missing".into(),
        }]
    );
}

#[test]
fn mixin_cycle_is_detected() {
    let g = graph(vec![
        ("A", RuleDecl::new().mixin("B").map(&["X"])),
        ("B", RuleDecl::new().mixin("A").map(&["Y"])),
        ("C", RuleDecl::new().map(&["Z"])),
    ]);
    assert!(
        g.diagnostics()
            .iter()
            .any(|d| matches!(d, RuleDiagnostic::MixinCycle { .. }))
    );
    // Each side keeps at least its own literal rules.
    assert!(g.resolve("A").map.contains("X"));
    assert!(g.resolve("B").map.contains("Y"));
    assert_eq!(g.resolve("C").map, set(&["Z"]));
}

#[test]
fn self_mixin_is_a_cycle() {
    let g = graph(vec![("A", RuleDecl::new().mixin("A").map(&["X"]))]);
    assert_eq!(
        g.diagnostics(),
        &[RuleDiagnostic::MixinCycle {
            path: vec!["A".into(), "A".into()],
        }]
    );
    assert_eq!(g.resolve("A").map, set(&["X"]));
}

#[test]
fn resolution_is_idempotent() {
    let g = RuleGraph::builtin();
    let first = g.resolve("Control").clone();
    let second = g.resolve("Control").clone();
    assert_eq!(first, second);
}

// ── Built-in table ───────────────────────────────────────────────

#[test]
fn builtin_has_no_diagnostics() {
    assert!(RuleGraph::builtin().diagnostics().is_empty());
}

#[test]
fn builtin_control_maps_to_itself() {
    let g = RuleGraph::builtin();
    assert!(g.allows("Control", RuleField::Map, "Control"));
    assert!(!g.allows("Objective", RuleField::Map, "Objective"));
    assert!(g.allows("Objective", RuleField::Map, "Control"));
}

#[test]
fn builtin_program_is_mega_and_creates_audits() {
    let g = RuleGraph::builtin();
    let program = g.resolve("Program");
    assert!(program.mega);
    assert!(program.map.contains("Program"));
    assert_eq!(g.creatable_types("Program"), vec![TypeName::from("Audit")]);
    assert!(!g.resolve("Control").mega);
}

#[test]
fn builtin_snapshotables_reach_audits_indirectly() {
    let g = RuleGraph::builtin();
    let indirect = g.indirect_types("System");
    assert!(indirect.contains(&TypeName::from("Audit")));
    assert!(!g.allows("System", RuleField::Map, "Audit"));
}

#[test]
fn builtin_external_management() {
    let g = RuleGraph::builtin();
    assert!(g.allows("Control", RuleField::ExternalMap, "Risk"));
    assert!(g.allows("Control", RuleField::ExternalUnmap, "Threat"));
    assert!(!g.allows("Risk", RuleField::ExternalMap, "Threat"));
}

#[test]
fn builtin_map_sets_respect_self_invariant() {
    let g = RuleGraph::builtin();
    for name in ["Objective", "System", "Issue", "Document", "Risk"] {
        assert!(!g.resolve(name).map.contains(name), "{name} maps to itself");
        assert!(!g.resolve(name).unmap.contains(name), "{name} unmaps itself");
    }
}

#[test]
fn builtin_rules_cover_every_snapshotable_type() {
    let g = RuleGraph::builtin();
    let registry = TypeRegistry::builtin();
    let snapshotable = registry.snapshotable_types();
    assert!(!snapshotable.is_empty());
    for name in &snapshotable {
        assert!(g.contains(name.as_str()), "{name} has no rules");
        assert!(g.allows("Audit", RuleField::Map, name.as_str()), "Audit cannot map {name}");
        assert!(g.indirect_types(name.as_str()).contains(&TypeName::from("Audit")));
    }
}
