use grcmap_model::TypeRegistry;
use grcmap_query::{
    FilterExpression, Paging, QueryCompiler, QueryIndices, QueryPermission, QuerySpec, RelevanceFilter,
    RelevanceOp, ResultKind, SortKey, parse_filter,
};
use grcmap_rules::{CompatibilityEvaluator, RuleGraph};
use grcmap_types::{EntityLike, EntityRef, TypeName};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn compiler() -> QueryCompiler {
    QueryCompiler::new(
        Arc::new(TypeRegistry::builtin()),
        CompatibilityEvaluator::allow_all(Arc::new(RuleGraph::builtin())),
    )
}

// ── Batch layout ─────────────────────────────────────────────────

#[test]
fn no_base_yields_primary_only() {
    let compiled = compiler().compile(&QuerySpec::new("Control"));

    assert_eq!(compiled.request.len(), 1);
    assert_eq!(compiled.indices.primary, 0);
    assert_eq!(compiled.indices.related, None);
    assert!(!compiled.is_mega());
    assert_eq!(compiled.primary().unwrap().object_name(), "Control");
}

#[test]
fn base_adds_related_ids_query() {
    let spec = QuerySpec::new("Control").with_base(EntityRef::new(4, "Program"));
    let compiled = compiler().compile(&spec);

    assert_eq!(compiled.request.len(), 2);
    let related = &compiled.request[compiled.indices.related.unwrap()];
    assert_eq!(related.object_name(), "Control");
    assert_eq!(related.result_kind(), ResultKind::Ids);
    assert_eq!(
        related.relevance(),
        &[RelevanceFilter::new("Program", vec![4], RelevanceOp::Relevant)]
    );
    assert!(related.paging().is_none());
}

#[test]
fn mega_mode_replaces_related_with_parent_and_child() {
    let spec = QuerySpec::new("Program")
        .with_base(EntityRef::new(1, "Program"))
        .mega(true);
    let compiled = compiler().compile(&spec);

    assert_eq!(compiled.request.len(), 3);
    assert_eq!(compiled.indices.related, None);
    assert_eq!(compiled.indices.parent, Some(1));
    assert_eq!(compiled.indices.child, Some(2));
    assert_eq!(compiled.request[1].relevance()[0].op, RelevanceOp::Parent);
    assert_eq!(compiled.request[2].relevance()[0].op, RelevanceOp::Child);
    assert!(compiled.is_mega());
}

#[test]
fn mega_mode_without_base_emits_no_relation_queries() {
    let compiled = compiler().compile(&QuerySpec::new("Program").mega(true));
    assert_eq!(compiled.request.len(), 1);
    assert_eq!(compiled.indices, QueryIndices::default());
}

// ── Snapshot rewriting ───────────────────────────────────────────

#[test]
fn snapshot_search_rewrites_object_name_and_filter() {
    let original = parse_filter(r#""Title" ~ "access""#).unwrap();
    let spec = QuerySpec::new("Control")
        .with_base(EntityRef::new(9, "Audit"))
        .with_filter(original.clone())
        .use_snapshots(true);
    let compiled = compiler().compile(&spec);

    let primary = compiled.primary().unwrap();
    assert_eq!(primary.object_name(), "Snapshot");
    assert_eq!(
        primary.expression(),
        &FilterExpression::eq("child_type", "Control").join(original)
    );
    assert!(compiled.snapshots);
}

#[test]
fn snapshot_rewrite_reaches_related_query() {
    let spec = QuerySpec::new("Control")
        .with_base(EntityRef::new(9, "Audit"))
        .use_snapshots(true);
    let compiled = compiler().compile(&spec);

    let related = &compiled.request[compiled.indices.related.unwrap()];
    assert_eq!(related.object_name(), "Snapshot");
    assert_eq!(related.expression(), &FilterExpression::eq("child_type", "Control"));
    // Both queries share an object name; only the indices tell them apart.
    assert_eq!(compiled.request[0].object_name(), related.object_name());
}

#[test]
fn anchors_are_not_rewritten() {
    let anchor = RelevanceFilter::relevant("Regulation", 12);
    let spec = QuerySpec::new("Control")
        .with_anchor(anchor.clone())
        .use_snapshots(true);
    let compiled = compiler().compile(&spec);

    assert_eq!(compiled.primary().unwrap().relevance(), &[anchor]);
}

// ── Paging ───────────────────────────────────────────────────────

#[test]
fn values_query_keeps_paging_and_sort() {
    let paging = Paging::new(2, 25).sorted_by(SortKey::desc("updated_at"));
    let compiled = compiler().compile(&QuerySpec::new("Risk").with_paging(paging.clone()));

    assert_eq!(compiled.primary().unwrap().paging(), Some(&paging));
    assert_eq!(paging.limit(), (25, 50));
}

#[test]
fn ids_query_never_carries_sort() {
    let paging = Paging::new(1, 10).sorted_by(SortKey::asc("title"));
    let spec = QuerySpec::new("Risk")
        .with_paging(paging)
        .result_kind(ResultKind::Ids);
    let compiled = compiler().compile(&spec);

    let primary = compiled.primary().unwrap();
    assert!(primary.paging().is_none());
    let body = primary.to_json();
    assert!(body.get("paging").is_none());
    assert!(!body.to_string().contains("sort"));
}

#[test]
fn count_query_is_unpaged() {
    let spec = QuerySpec::new("Risk").result_kind(ResultKind::Count);
    assert!(compiler().compile(&spec).primary().unwrap().paging().is_none());
}

// ── Primary filter ───────────────────────────────────────────────

#[test]
fn statuses_become_in_condition() {
    let spec = QuerySpec::new("Risk").with_statuses(["Draft", "Active"]);
    let compiled = compiler().compile(&spec);

    assert_eq!(
        compiled.primary().unwrap().expression(),
        &FilterExpression::one_of("Status", vec!["Draft".into(), "Active".into()])
    );
}

#[test]
fn unlocked_constraint_excludes_archived() {
    let advanced = FilterExpression::contains("Title", "2024");
    let compiled = compiler().compile(&QuerySpec::new("Audit").with_filter(advanced.clone()));

    assert_eq!(
        compiled.primary().unwrap().expression(),
        &advanced.join(FilterExpression::eq("archived", false))
    );
}

#[test]
fn owned_constraint_anchors_on_current_user() {
    let compiled = compiler()
        .with_current_user(77)
        .compile(&QuerySpec::new("Workflow"));

    assert_eq!(
        compiled.primary().unwrap().relevance(),
        &[RelevanceFilter::new("Person", vec![77], RelevanceOp::Owned)]
    );
}

#[test]
fn owned_constraint_without_user_is_skipped() {
    let compiled = compiler().compile(&QuerySpec::new("Workflow"));
    assert!(compiled.primary().unwrap().relevance().is_empty());
}

// ── Mapper specs ─────────────────────────────────────────────────

#[test]
fn mapper_spec_uses_snapshots_under_audit() {
    let audit: EntityLike = EntityRef::new(9, "Audit").into();
    let spec = compiler().mapper_spec(&audit, &TypeName::from("Control"));

    assert!(spec.use_snapshots);
    assert!(!spec.mega);
    assert_eq!(spec.base, Some(EntityRef::new(9, "Audit")));
    assert_eq!(spec.permissions, Some(QueryPermission::Update));
}

#[test]
fn mapper_spec_flags_mega_programs() {
    let program: EntityLike = EntityRef::new(1, "Program").into();
    let spec = compiler().mapper_spec(&program, &TypeName::from("Program"));

    assert!(spec.mega);
    assert!(!spec.use_snapshots);
}

#[test]
fn mapper_spec_from_draft_has_no_base() {
    let spec = compiler().mapper_spec(&EntityLike::Draft("Program".into()), &TypeName::from("Control"));
    assert_eq!(spec.base, None);
    assert_eq!(compiler().compile(&spec).request.len(), 1);
}

// ── Counts ───────────────────────────────────────────────────────

#[test]
fn counts_rewrite_per_type() {
    let audit = EntityRef::new(9, "Audit");
    let counts = compiler().compile_counts(&audit, &["Control".into(), "Issue".into()]);

    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].object_name(), "Snapshot");
    assert_eq!(counts[0].expression(), &FilterExpression::eq("child_type", "Control"));
    assert_eq!(counts[1].object_name(), "Issue");
    assert!(counts[1].expression().is_empty());
    assert!(counts.iter().all(|c| c.result_kind() == ResultKind::Count));
}

// ── Wire shape ───────────────────────────────────────────────────

#[test]
fn descriptor_serializes_for_the_query_service() {
    let spec = QuerySpec::new("Control")
        .with_filter(FilterExpression::eq("Title", "x"))
        .with_permissions(QueryPermission::Update);
    let body = compiler().compile(&spec).request[0].to_json();

    assert_eq!(
        body,
        json!({
            "object_name": "Control",
            "filters": {
                "expression": { "left": "Title", "op": { "name": "=" }, "right": "x" },
            },
            "paging": { "current": 1, "page_size": 10 },
            "type": "values",
            "permissions": "update",
        })
    );
}
