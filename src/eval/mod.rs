//! Evaluation subsystem
//!
//! Two evaluation disciplines over the same tree:
//!
//! 1. Fast path: `Check::test` / `Transformer::apply` run the composed
//!    behaviors directly. No record is allocated, nothing is logged, faults
//!    propagate unmodified.
//! 2. Explain path: [`Evaluator::explain`] replays the tree with the same
//!    input, appending one entry per visited node to an
//!    [`EvaluationRecord`]. Shortcut and cut decisions mirror the fast path
//!    exactly, so the record never shows a child the fast path skipped.
//!
//! # Invariants
//!
//! - The record's root output equals the fast-path result for the same input
//!   (given deterministic behaviors)
//! - Faults are recorded at their origin, then returned wrapped; never
//!   downgraded to `false`
//! - All per-evaluation state lives in the explain context, not in nodes

mod config;
mod errors;
mod evaluator;
pub(crate) mod explainer;
mod record;

pub use config::ExplainConfig;
pub use errors::{BoxError, ExplainError, ExplainResult};
pub use evaluator::Evaluator;
pub use record::{EntryKind, EvaluationEntry, EvaluationRecord, Output, Remaining};
