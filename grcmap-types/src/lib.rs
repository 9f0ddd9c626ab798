//! Core type definitions for grcmap.
//!
//! This crate defines the small value types every other grcmap crate speaks:
//! - [`TypeName`]: the identifier of a domain type ("Control", "Audit")
//! - [`EntityRef`]: an `(id, type)` reference, optionally pointing through a snapshot
//! - [`EntityLike`]: either a reference, an unsaved draft, or a bare type name
//! - [`Action`], [`JoinAction`], [`MegaRelation`]: the verbs of mapping
//!
//! Nothing here knows about rules, queries or ledgers; those live in the
//! crates layered on top.

mod action;
mod entity;
mod name;

pub use action::{Action, JoinAction, MegaRelation};
pub use entity::{ContextId, EntityLike, EntityRef, ObjectId};
pub use name::{SNAPSHOT_TYPE, TypeName};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when constructing core values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid type name: {0:?}")]
    InvalidTypeName(String),

    #[error("unknown {kind}: {value:?}")]
    UnknownLiteral { kind: &'static str, value: String },
}
