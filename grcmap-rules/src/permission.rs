//! Permission oracle consulted by the compatibility evaluator.

use grcmap_types::{Action, ContextId, EntityLike, ObjectId, TypeName};
use std::collections::HashSet;

/// Answers whether the acting user may perform `action` on a subject.
pub trait PermissionOracle: Send + Sync {
    /// `context_id` scopes the question to a security context; `None` asks
    /// about the subject itself.
    fn is_allowed_for(
        &self,
        action: Action,
        subject: &EntityLike,
        context_id: Option<ContextId>,
    ) -> bool;
}

/// Grants everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionOracle for AllowAll {
    fn is_allowed_for(&self, _: Action, _: &EntityLike, _: Option<ContextId>) -> bool {
        true
    }
}

/// An explicit grant table, for tests and static deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissions {
    /// `(action, type)` granted on every object of the type.
    by_type: HashSet<(Action, TypeName)>,
    /// `(action, type, id)` granted on one object.
    by_object: HashSet<(Action, TypeName, ObjectId)>,
    /// `(action, type, context)` granted within one security context.
    by_context: HashSet<(Action, TypeName, ContextId)>,
}

impl StaticPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_type(&mut self, action: Action, entity_type: &str) {
        self.by_type.insert((action, entity_type.into()));
    }

    pub fn grant_object(&mut self, action: Action, entity_type: &str, id: ObjectId) {
        self.by_object.insert((action, entity_type.into(), id));
    }

    pub fn grant_in_context(&mut self, action: Action, entity_type: &str, context_id: ContextId) {
        self.by_context
            .insert((action, entity_type.into(), context_id));
    }

    #[must_use]
    pub fn with_type(mut self, action: Action, entity_type: &str) -> Self {
        self.grant_type(action, entity_type);
        self
    }

    #[must_use]
    pub fn with_object(mut self, action: Action, entity_type: &str, id: ObjectId) -> Self {
        self.grant_object(action, entity_type, id);
        self
    }

    #[must_use]
    pub fn with_context(mut self, action: Action, entity_type: &str, context_id: ContextId) -> Self {
        self.grant_in_context(action, entity_type, context_id);
        self
    }
}

impl PermissionOracle for StaticPermissions {
    fn is_allowed_for(
        &self,
        action: Action,
        subject: &EntityLike,
        context_id: Option<ContextId>,
    ) -> bool {
        let entity_type = match subject {
            EntityLike::Ref(entity) => entity.entity_type.clone(),
            EntityLike::Draft(name) | EntityLike::Type(name) => name.clone(),
        };

        if let Some(ctx) = context_id {
            return self.by_context.contains(&(action, entity_type, ctx));
        }

        if self.by_type.contains(&(action, entity_type.clone())) {
            return true;
        }
        match subject.entity() {
            Some(entity) => self.by_object.contains(&(action, entity_type, entity.id)),
            None => false,
        }
    }
}
