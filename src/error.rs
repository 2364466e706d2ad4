//! Error types for the trait composition engine.

use thiserror::Error;

/// Errors surfaced by trait construction, resolution, and instantiation.
///
/// Composition itself never fails: conflicting definitions travel through
/// the algebra as `Conflict` markers and only become errors when an
/// instantiation is attempted. Every variant carries the offending
/// property name; when several properties offend at once, the
/// lexicographically first one is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraitError {
    /// A behavior or state record bound the same name twice.
    #[error("duplicate property `{0}` in trait literal")]
    InvalidTraitLiteral(String),

    /// A rename/exclude directive referenced a property the trait does
    /// not have. Stale directives mask mis-targeted conflict fixes, so
    /// they are rejected instead of ignored.
    #[error("resolution directive references unknown property `{0}`")]
    UnknownPropertyReference(String),

    /// Instantiation was attempted while a property still has two or
    /// more candidate definitions.
    #[error("property `{0}` has conflicting definitions; exclude or rename one side before instantiating")]
    UnresolvedConflict(String),

    /// Instantiation was attempted while a required property is neither
    /// implemented by a composed trait nor supplied by the state object.
    #[error("required property `{0}` was not provided by any trait or by the state object")]
    UnsatisfiedRequirement(String),
}

impl TraitError {
    /// The property name the error is about.
    pub fn property(&self) -> &str {
        match self {
            TraitError::InvalidTraitLiteral(name)
            | TraitError::UnknownPropertyReference(name)
            | TraitError::UnresolvedConflict(name)
            | TraitError::UnsatisfiedRequirement(name) => name,
        }
    }
}

/// Result type for trait algebra operations.
pub type TraitResult<T> = Result<T, TraitError>;
