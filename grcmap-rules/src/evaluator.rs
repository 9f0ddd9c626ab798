//! Compatibility evaluator: can X be mapped to / unmapped from Y?

use crate::graph::RuleGraph;
use crate::permission::{AllowAll, PermissionOracle};
use crate::ruleset::RuleField;
use grcmap_types::{Action, EntityLike, TypeName};
use std::sync::Arc;
use tracing::debug;

/// Type whose create right, scoped to a target's context, substitutes for
/// update rights on the target itself.
pub const RELATIONSHIP_TYPE: &str = "Relationship";

/// Caller context for a compatibility check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapOptions {
    /// The check is made on behalf of an unmap action; one-way forbidden
    /// pairs do not apply.
    pub unmap_context: bool,
    /// The parent instance the mapper was opened from is a snapshot.
    pub parent_is_snapshot: bool,
}

impl MapOptions {
    pub fn unmap_context() -> Self {
        Self {
            unmap_context: true,
            ..Self::default()
        }
    }

    pub fn in_snapshot_scope() -> Self {
        Self {
            parent_is_snapshot: true,
            ..Self::default()
        }
    }
}

/// Applies forbidden pairs, the snapshot-scope veto, the rule graph and the
/// permission oracle, in that order.
#[derive(Clone)]
pub struct CompatibilityEvaluator {
    graph: Arc<RuleGraph>,
    permissions: Arc<dyn PermissionOracle>,
}

impl CompatibilityEvaluator {
    pub fn new(graph: Arc<RuleGraph>, permissions: Arc<dyn PermissionOracle>) -> Self {
        Self { graph, permissions }
    }

    /// An evaluator that skips permission checks.
    pub fn allow_all(graph: Arc<RuleGraph>) -> Self {
        Self::new(graph, Arc::new(AllowAll))
    }

    pub fn graph(&self) -> &Arc<RuleGraph> {
        &self.graph
    }

    /// Whether `target` may be mapped to `source`.
    pub fn can_map(&self, source: &EntityLike, target: &EntityLike, options: &MapOptions) -> bool {
        let source_type = source.effective_type();
        let target_type = target.effective_type();

        if !options.unmap_context
            && self
                .graph
                .forbidden()
                .is_one_way_forbidden(source_type.as_str(), target_type.as_str())
        {
            debug!("Mapping {} onto {} is forbidden", source_type, target_type);
            return false;
        }
        if self.is_two_way_forbidden(source_type, target_type) {
            return false;
        }
        if options.parent_is_snapshot {
            debug!("Snapshot scope refuses new mappings to {}", target_type);
            return false;
        }
        if !self.rule_allows(RuleField::Map, source_type, target_type) {
            return false;
        }
        self.has_permissions(source, target)
    }

    /// Whether `target` may be unmapped from `source`. Unlike [`Self::can_map`]
    /// this ignores one-way forbidden pairs and the snapshot-scope veto, so
    /// stale relationships can always be cleaned up.
    pub fn can_unmap(&self, source: &EntityLike, target: &EntityLike) -> bool {
        let source_type = source.effective_type();
        let target_type = target.effective_type();

        if self.is_two_way_forbidden(source_type, target_type) {
            return false;
        }
        if !self.rule_allows(RuleField::Unmap, source_type, target_type) {
            return false;
        }
        self.has_permissions(source, target)
    }

    /// The relationship must be created or removed by an external system of
    /// record rather than through the local mapping path.
    pub fn is_externally_managed(&self, source_type: &str, target_type: &str) -> bool {
        self.is_externally_mapped(source_type, target_type)
            || self.is_externally_unmapped(source_type, target_type)
    }

    pub fn is_externally_mapped(&self, source_type: &str, target_type: &str) -> bool {
        self.graph
            .allows(source_type, RuleField::ExternalMap, target_type)
    }

    pub fn is_externally_unmapped(&self, source_type: &str, target_type: &str) -> bool {
        self.graph
            .allows(source_type, RuleField::ExternalUnmap, target_type)
    }

    /// Target types offered in a type selector for `source`, sorted.
    pub fn mappable_targets(&self, source: &EntityLike, options: &MapOptions) -> Vec<TypeName> {
        let mut targets: Vec<TypeName> = self
            .graph
            .mappable_types(source.effective_type().as_str())
            .into_iter()
            .filter(|target| self.can_map(source, &EntityLike::Type(target.clone()), options))
            .collect();
        targets.sort();
        targets
    }

    /// Same-type mappings of a type flagged `mega` carry a parent/child direction.
    pub fn is_mega_mapping(&self, source: &EntityLike, target: &EntityLike) -> bool {
        let source_type = source.effective_type();
        source_type == target.effective_type() && self.graph.resolve(source_type.as_str()).mega
    }

    fn is_two_way_forbidden(&self, source_type: &TypeName, target_type: &TypeName) -> bool {
        let forbidden = self
            .graph
            .forbidden()
            .is_two_way_forbidden(source_type.as_str(), target_type.as_str());
        if forbidden {
            debug!("Mapping between {} and {} is forbidden", source_type, target_type);
        }
        forbidden
    }

    /// Rules are framed from whichever side opened the mapper, so either
    /// direction satisfies the check.
    fn rule_allows(&self, field: RuleField, source_type: &TypeName, target_type: &TypeName) -> bool {
        self.graph
            .allows(source_type.as_str(), field, target_type.as_str())
            || self
                .graph
                .allows(target_type.as_str(), field, source_type.as_str())
    }

    fn has_permissions(&self, source: &EntityLike, target: &EntityLike) -> bool {
        let source_ok = match source {
            EntityLike::Ref(_) => self.permissions.is_allowed_for(Action::Update, source, None),
            EntityLike::Draft(_) | EntityLike::Type(_) => true,
        };
        if !source_ok {
            debug!("No update permission on {}", source.effective_type());
            return false;
        }

        match target.entity() {
            Some(entity) => {
                self.permissions.is_allowed_for(Action::Update, target, None)
                    || entity.context_id.is_some_and(|ctx| {
                        self.permissions.is_allowed_for(
                            Action::Create,
                            &EntityLike::Type(RELATIONSHIP_TYPE.into()),
                            Some(ctx),
                        )
                    })
            }
            None => true,
        }
    }
}
