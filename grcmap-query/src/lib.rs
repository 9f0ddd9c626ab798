//! Query composition for grcmap.
//!
//! Turns a mapper search into a batch of query descriptors and its response
//! back into selectable items.
//!
//! # Pieces
//!
//! - [`FilterExpression`]: AND/OR tree of conditions, with a textual form
//!   ([`parse_filter`], `Display`) and the JSON form the service consumes.
//! - [`QueryDescriptor`]: one query of a batch; only `values` queries are paged.
//! - [`QueryCompiler`]: builds the primary query plus related or mega
//!   parent/child queries, rewriting target-type queries to snapshots when asked.
//! - [`CompiledQuery::decode`] / [`CompiledQuery::resolve`]: positional
//!   response decoding, "already mapped" marking and mega classification.
//! - [`SearchSession`]: last request wins over a [`QueryService`].
//!
//! # Example
//!
//! ```
//! use grcmap_model::TypeRegistry;
//! use grcmap_query::{QueryCompiler, QuerySpec, parse_filter};
//! use grcmap_rules::{CompatibilityEvaluator, RuleGraph};
//! use grcmap_types::EntityRef;
//! use std::sync::Arc;
//!
//! let compiler = QueryCompiler::new(
//!     Arc::new(TypeRegistry::builtin()),
//!     CompatibilityEvaluator::allow_all(Arc::new(RuleGraph::builtin())),
//! );
//! let spec = QuerySpec::new("Control")
//!     .with_base(EntityRef::new(4, "Program"))
//!     .with_filter(parse_filter(r#""Title" ~ "access""#).unwrap());
//!
//! let compiled = compiler.compile(&spec);
//! assert_eq!(compiled.request.len(), 2);
//! assert_eq!(compiled.indices.related, Some(1));
//! ```

mod compiler;
mod descriptor;
mod error;
mod filter;
pub mod mega;
mod parser;
mod response;
pub mod service;

pub use compiler::{
    ARCHIVED_FIELD, CompiledQuery, PERSON_TYPE, QueryCompiler, QueryIndices, QuerySpec,
    STATUS_FIELD,
};
pub use descriptor::{
    Paging, QueryDescriptor, QueryDescriptorBuilder, QueryFilters, QueryPermission,
    RelevanceFilter, RelevanceOp, ResultKind, SortDirection, SortKey,
};
pub use error::{QueryError, QueryResult};
pub use filter::{CHILD_TYPE_FIELD, ComparisonOp, Condition, FilterExpression, FilterValue, LogicalOp};
pub use mega::{MegaOverrides, classify, mark_mapped};
pub use parser::{MAX_FILTER_DEPTH, parse_filter};
pub use response::{ResultItem, ResultSet, SearchOutcome};
pub use service::{QueryService, RequestToken, SearchSession};
