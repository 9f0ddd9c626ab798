//! Mapping rules for grcmap.
//!
//! Answers one question in several shapes: given two domain types (or
//! instances of them), may one be created, mapped, unmapped or only
//! externally mapped relative to the other?
//!
//! # Components
//!
//! - **Declarations** ([`RuleDecl`], [`Mixin`]): per-type literal rule fields
//!   plus mixins, which are named references, inline rule sets, or transform
//!   functions that mutate an accumulator.
//! - **Graph** ([`RuleGraph`]): resolves every declaration once at
//!   construction into a flat [`TypeRuleSet`]. Unknown mixins and mixin cycles
//!   degrade to partial rules and are reported as [`RuleDiagnostic`]s.
//! - **Evaluator** ([`CompatibilityEvaluator`]): `can_map`, `can_unmap` and
//!   `is_externally_managed`, layering forbidden pairs, the snapshot-scope
//!   veto and [`PermissionOracle`] checks over the graph.
//!
//! # Example
//!
//! ```
//! use grcmap_rules::{CompatibilityEvaluator, MapOptions, RuleGraph};
//! use grcmap_types::{EntityLike, EntityRef};
//! use std::sync::Arc;
//!
//! let evaluator = CompatibilityEvaluator::allow_all(Arc::new(RuleGraph::builtin()));
//! let program: EntityLike = EntityRef::new(1, "Program").into();
//! let control: EntityLike = EntityRef::new(7, "Control").into();
//!
//! assert!(evaluator.can_map(&program, &control, &MapOptions::default()));
//! ```

mod builtin;
mod decl;
mod error;
mod evaluator;
mod file;
mod forbidden;
mod graph;
pub mod permission;
mod ruleset;

pub use decl::{Mixin, RuleAccumulator, RuleDecl, RuleTransform};
pub use error::{RuleDiagnostic, RuleError, RuleResult};
pub use evaluator::{CompatibilityEvaluator, MapOptions, RELATIONSHIP_TYPE};
pub use forbidden::ForbiddenPairs;
pub use graph::RuleGraph;
pub use permission::{AllowAll, PermissionOracle, StaticPermissions};
pub use ruleset::{RuleField, TypeRuleSet};
