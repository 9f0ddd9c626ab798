//! Error types for registry loading.

use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur while loading a type registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Registry file is not valid TOML or does not match the expected shape.
    #[error("failed to parse registry: {0}")]
    Parse(#[from] toml::de::Error),

    /// A declared type name is not a valid identifier.
    #[error("invalid type declaration: {0}")]
    InvalidType(#[from] grcmap_types::Error),
}
