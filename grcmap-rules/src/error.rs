//! Error and diagnostic types for rule tables.

use thiserror::Error;

/// Result type for rule loading.
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors that can occur while loading a rules file.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to parse rules: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid type name in rules: {0}")]
    InvalidType(#[from] grcmap_types::Error),
}

/// A problem found while resolving declarations.
///
/// Diagnostics never abort resolution: the offending mixin is skipped and
/// the type keeps whatever rules the rest of its declaration provides.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleDiagnostic {
    #[error("{owner}: unknown mixin {mixin:?}")]
    UnknownMixin { owner: String, mixin: String },

    #[error("mixin cycle: {}", path.join(" -> "))]
    MixinCycle { path: Vec<String> },
}
