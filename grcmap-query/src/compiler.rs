//! Query compiler: turns a search request into a positionally-ordered batch.
//!
//! A compiled batch always starts with the primary query. Depending on the
//! request it is followed by a single "related" query (ids already mapped to
//! the base object) or, in mega mode, by a "parent" and a "child" query. The
//! position of each is recorded in [`QueryIndices`]; two entries may share an
//! object name once snapshot rewriting kicks in, so callers must go through
//! the indices rather than search the batch by name.

use crate::descriptor::{
    Paging, QueryDescriptor, QueryPermission, RelevanceFilter, RelevanceOp, ResultKind,
};
use crate::filter::FilterExpression;
use grcmap_model::{QueryConstraint, TypeRegistry};
use grcmap_rules::CompatibilityEvaluator;
use grcmap_types::{EntityLike, EntityRef, ObjectId, TypeName};
use std::sync::Arc;
use tracing::{debug, warn};

/// Field the status filter constrains.
pub const STATUS_FIELD: &str = "Status";

/// Field the `Unlocked` constraint constrains.
pub const ARCHIVED_FIELD: &str = "archived";

/// Type the `OwnedByCurrentUser` constraint anchors on.
pub const PERSON_TYPE: &str = "Person";

/// Everything the compiler needs to know about one search.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub target_type: TypeName,
    /// Object the mapper was opened from; drives related and mega queries.
    pub base: Option<EntityRef>,
    /// Relevance constraints on other types, applied to the primary query only.
    pub anchors: Vec<RelevanceFilter>,
    /// Advanced-search expression.
    pub filter: FilterExpression,
    /// Allowed values of the status field; empty means any.
    pub statuses: Vec<String>,
    pub paging: Paging,
    pub mega: bool,
    pub use_snapshots: bool,
    pub result_kind: ResultKind,
    pub permissions: Option<QueryPermission>,
}

impl QuerySpec {
    pub fn new(target_type: impl Into<TypeName>) -> Self {
        Self {
            target_type: target_type.into(),
            base: None,
            anchors: Vec::new(),
            filter: FilterExpression::Empty,
            statuses: Vec::new(),
            paging: Paging::default(),
            mega: false,
            use_snapshots: false,
            result_kind: ResultKind::Values,
            permissions: None,
        }
    }

    #[must_use]
    pub fn with_base(mut self, base: EntityRef) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: RelevanceFilter) -> Self {
        self.anchors.push(anchor);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.statuses = statuses.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_paging(mut self, paging: Paging) -> Self {
        self.paging = paging;
        self
    }

    #[must_use]
    pub fn mega(mut self, mega: bool) -> Self {
        self.mega = mega;
        self
    }

    #[must_use]
    pub fn use_snapshots(mut self, use_snapshots: bool) -> Self {
        self.use_snapshots = use_snapshots;
        self
    }

    #[must_use]
    pub fn result_kind(mut self, kind: ResultKind) -> Self {
        self.result_kind = kind;
        self
    }

    #[must_use]
    pub fn with_permissions(mut self, permissions: QueryPermission) -> Self {
        self.permissions = Some(permissions);
        self
    }
}

/// Batch positions of each query in a [`CompiledQuery`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryIndices {
    pub primary: usize,
    pub related: Option<usize>,
    pub parent: Option<usize>,
    pub child: Option<usize>,
}

/// A compiled batch plus what is needed to decode its response.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub request: Vec<QueryDescriptor>,
    pub indices: QueryIndices,
    /// Target-type queries were rewritten to the snapshot type.
    pub snapshots: bool,
    pub target_type: TypeName,
    pub base: Option<EntityRef>,
}

impl CompiledQuery {
    pub fn primary(&self) -> Option<&QueryDescriptor> {
        self.request.get(self.indices.primary)
    }

    pub fn is_mega(&self) -> bool {
        self.indices.parent.is_some() || self.indices.child.is_some()
    }
}

/// Compiles [`QuerySpec`]s against a type registry.
#[derive(Clone)]
pub struct QueryCompiler {
    registry: Arc<TypeRegistry>,
    evaluator: CompatibilityEvaluator,
    current_user: Option<ObjectId>,
    snapshot_type: TypeName,
}

impl QueryCompiler {
    pub fn new(registry: Arc<TypeRegistry>, evaluator: CompatibilityEvaluator) -> Self {
        Self {
            registry,
            evaluator,
            current_user: None,
            snapshot_type: TypeName::snapshot(),
        }
    }

    /// Person id used by the `OwnedByCurrentUser` constraint.
    #[must_use]
    pub fn with_current_user(mut self, person_id: ObjectId) -> Self {
        self.current_user = Some(person_id);
        self
    }

    #[must_use]
    pub fn with_snapshot_type(mut self, snapshot_type: impl Into<TypeName>) -> Self {
        self.snapshot_type = snapshot_type.into();
        self
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn evaluator(&self) -> &CompatibilityEvaluator {
        &self.evaluator
    }

    /// The [`QuerySpec`] a mapper opened from `base` uses to search for `target_type`.
    ///
    /// Snapshots are used when the base type scopes snapshots of the target,
    /// and mega mode when the pair is a mega mapping.
    pub fn mapper_spec(&self, base: &EntityLike, target_type: &TypeName) -> QuerySpec {
        let base_type = base.effective_type();
        let use_snapshots = self
            .registry
            .is_snapshot_related(base_type.as_str(), target_type.as_str());
        let mega = self
            .evaluator
            .is_mega_mapping(base, &EntityLike::Type(target_type.clone()));

        let mut spec = QuerySpec::new(target_type.clone())
            .use_snapshots(use_snapshots)
            .mega(mega)
            .with_permissions(QueryPermission::Update);
        spec.base = base.entity().cloned();
        spec
    }

    pub fn compile(&self, spec: &QuerySpec) -> CompiledQuery {
        let object_name = if spec.use_snapshots {
            self.snapshot_type.clone()
        } else {
            spec.target_type.clone()
        };
        let scope = |expr: FilterExpression| {
            if spec.use_snapshots {
                expr.rewrite_for_snapshot(&spec.target_type)
            } else {
                expr
            }
        };

        let mut request = Vec::new();

        let mut primary = QueryDescriptor::builder(object_name.clone())
            .filter(scope(self.primary_filter(spec)))
            .result_kind(spec.result_kind)
            .paging(spec.paging.clone());
        for anchor in &spec.anchors {
            primary = primary.relevant_to(anchor.clone());
        }
        if let Some(owner) = self.owner_anchor(&spec.target_type) {
            primary = primary.relevant_to(owner);
        }
        if let Some(permissions) = spec.permissions {
            primary = primary.permissions(permissions);
        }
        request.push(primary.build());
        let mut indices = QueryIndices::default();

        let relation_query = |base: &EntityRef, op: RelevanceOp| {
            QueryDescriptor::builder(object_name.clone())
                .filter(scope(FilterExpression::Empty))
                .relevant_to(RelevanceFilter::new(
                    base.entity_type.clone(),
                    vec![base.id],
                    op,
                ))
                .result_kind(ResultKind::Ids)
                .build()
        };

        match (&spec.base, spec.mega) {
            (Some(base), false) => {
                indices.related = Some(request.len());
                request.push(relation_query(base, RelevanceOp::Relevant));
            }
            (Some(base), true) => {
                indices.parent = Some(request.len());
                request.push(relation_query(base, RelevanceOp::Parent));
                indices.child = Some(request.len());
                request.push(relation_query(base, RelevanceOp::Child));
            }
            (None, true) => {
                warn!(
                    "Mega search for {} has no base object; skipping relation queries",
                    spec.target_type
                );
            }
            (None, false) => {}
        }

        debug!(
            "Compiled {} search into {} queries (snapshots: {})",
            spec.target_type,
            request.len(),
            spec.use_snapshots
        );

        CompiledQuery {
            request,
            indices,
            snapshots: spec.use_snapshots,
            target_type: spec.target_type.clone(),
            base: spec.base.clone(),
        }
    }

    /// One `count` query per type for tab counters, in `types` order.
    pub fn compile_counts(&self, base: &EntityRef, types: &[TypeName]) -> Vec<QueryDescriptor> {
        types
            .iter()
            .map(|target| {
                let snapshots = self
                    .registry
                    .is_snapshot_related(base.effective_type().as_str(), target.as_str());
                let (object_name, filter) = if snapshots {
                    (
                        self.snapshot_type.clone(),
                        FilterExpression::Empty.rewrite_for_snapshot(target),
                    )
                } else {
                    (target.clone(), FilterExpression::Empty)
                };
                QueryDescriptor::builder(object_name)
                    .filter(filter)
                    .relevant_to(RelevanceFilter::relevant(base.entity_type.clone(), base.id))
                    .result_kind(ResultKind::Count)
                    .build()
            })
            .collect()
    }

    /// Advanced filter AND status filter AND the type's own constraint.
    fn primary_filter(&self, spec: &QuerySpec) -> FilterExpression {
        let status = if spec.statuses.is_empty() {
            FilterExpression::Empty
        } else {
            FilterExpression::one_of(STATUS_FIELD, spec.statuses.clone())
        };
        let constraint = match self.registry.constraint(spec.target_type.as_str()) {
            Some(QueryConstraint::Unlocked) => FilterExpression::eq(ARCHIVED_FIELD, false),
            _ => FilterExpression::Empty,
        };
        spec.filter.clone().join(status).join(constraint)
    }

    fn owner_anchor(&self, target_type: &TypeName) -> Option<RelevanceFilter> {
        if self.registry.constraint(target_type.as_str()) != Some(QueryConstraint::OwnedByCurrentUser) {
            return None;
        }
        match self.current_user {
            Some(person) => Some(RelevanceFilter::new(
                PERSON_TYPE,
                vec![person],
                RelevanceOp::Owned,
            )),
            None => {
                warn!(
                    "{} searches are limited to owned objects but no current user is set",
                    target_type
                );
                None
            }
        }
    }
}
