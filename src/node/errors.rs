//! # Node Errors
//!
//! Construction errors are returned by constructors and are fatal to that
//! call. Bundle errors are evaluation faults raised by context checks.

use thiserror::Error;

/// Result type for node construction
pub type ConstructionResult<T> = Result<T, ConstructionError>;

/// Invalid arguments to a node constructor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// Identity creator tag was empty
    #[error("creator tag must not be empty")]
    EmptyCreator,

    /// A junction was built from an empty operand list
    #[error("`{0}` requires at least one operand")]
    MissingOperands(&'static str),

    /// A context check was built without bundle indices
    #[error("context check requires at least one bundle index")]
    MissingIndices,
}

impl ConstructionError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConstructionError::EmptyCreator => "CHECK_EMPTY_CREATOR",
            ConstructionError::MissingOperands(_) => "CHECK_MISSING_OPERANDS",
            ConstructionError::MissingIndices => "CHECK_MISSING_INDICES",
        }
    }
}

/// Faults raised while gathering values from an indexed bundle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleError {
    /// Index past the number of bound values
    #[error("bundle index {index} out of range for {len} bound values")]
    IndexOutOfRange { index: usize, len: usize },

    /// Relation received the wrong number of values
    #[error("relation `{relation}` expects {expected} values, got {actual}")]
    Arity {
        relation: String,
        expected: usize,
        actual: usize,
    },
}

impl BundleError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            BundleError::IndexOutOfRange { .. } => "CHECK_BUNDLE_INDEX",
            BundleError::Arity { .. } => "CHECK_RELATION_ARITY",
        }
    }
}
