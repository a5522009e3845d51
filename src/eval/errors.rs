//! Evaluation error types
//!
//! Error codes:
//! - CHECK_EVALUATION_FAULT (a behavior raised while explaining)

use thiserror::Error;

use super::record::EvaluationRecord;

/// Error raised by a node's underlying behavior.
///
/// The fast path hands it back to the caller unmodified.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for explain operations
pub type ExplainResult<T> = Result<T, ExplainError>;

/// Errors surfaced by the explain path
#[derive(Debug, Error)]
pub enum ExplainError {
    /// A behavior raised while the tree was being replayed.
    ///
    /// The record is complete up to and including the faulting node.
    #[error("evaluation fault in `{node}`: {source}")]
    Fault {
        /// Description of the node that raised
        node: String,
        /// Everything recorded before and at the fault
        record: Box<EvaluationRecord>,
        /// The original error
        #[source]
        source: BoxError,
    },
}

impl ExplainError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ExplainError::Fault { .. } => "CHECK_EVALUATION_FAULT",
        }
    }

    /// Returns the partial record
    pub fn record(&self) -> &EvaluationRecord {
        match self {
            ExplainError::Fault { record, .. } => record,
        }
    }

    /// Consumes the error, returning the original cause
    pub fn into_source(self) -> BoxError {
        match self {
            ExplainError::Fault { source, .. } => source,
        }
    }
}
