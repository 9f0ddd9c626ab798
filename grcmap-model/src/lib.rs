//! Type registry for grcmap.
//!
//! Defines the per-type metadata every other grcmap component consults:
//! - [`TypeMetadata`]: display names, category and snapshot flags for one type
//! - [`TypeCategory`]: the grouping used by type selectors
//! - [`QueryConstraint`]: extra filters a type imposes on every search for it
//! - [`TypeRegistry`]: the immutable table, built once at startup
//! - [`load_or_fallback`]: TOML file loading that degrades to built-in values
//!
//! The registry is a plain value: construct it once (from TOML or
//! [`TypeRegistry::builtin`]) and pass it by reference to the rule graph,
//! evaluator and query compiler.

mod builtin;
mod error;
mod loader;
mod metadata;
mod registry;

pub use builtin::{GOVERNANCE_TYPES, SCOPE_TYPES};

pub use error::{RegistryError, RegistryResult};
pub use loader::load_or_fallback;
pub use metadata::{QueryConstraint, TypeCategory, TypeMetadata};
pub use registry::TypeRegistry;
