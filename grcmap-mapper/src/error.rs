//! Error types for mapping operations.

use grcmap_types::{EntityRef, JoinAction, TypeName};
use thiserror::Error;

/// Result type for mapping operations.
pub type MapperResult<T> = Result<T, MapperError>;

/// Errors that can occur while mapping, unmapping or committing a ledger.
#[derive(Debug, Error)]
pub enum MapperError {
    /// The mapping service failed.
    #[error("mapping service error: {0}")]
    Transport(String),

    /// An unmap targeted a relationship that no longer exists.
    #[error(
        "{target} is not directly mapped to {parent}. It may be related through \
         another object; unmap that object instead."
    )]
    RelationshipNotFound { parent: EntityRef, target: EntityRef },

    /// The rule graph, forbidden pairs or permissions refuse the operation.
    #[error("cannot {action} {target} for {parent}")]
    NotAllowed {
        action: JoinAction,
        parent: TypeName,
        target: EntityRef,
    },

    /// An immediate operation was requested for a parent with no identity yet.
    #[error("{0} has not been saved yet; stage the change instead")]
    ParentNotPersisted(TypeName),

    /// Config file is not valid TOML for [`crate::MapperConfig`].
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
}
