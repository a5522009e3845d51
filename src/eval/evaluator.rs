//! Explain-path entry point
//!
//! The fast path is `Check::test` itself. The evaluator is only invoked
//! after the fast path returned `false`, with the same node and input, and
//! replays the tree while recording every visited node.

use std::fmt::Debug;

use super::config::ExplainConfig;
use super::errors::{ExplainError, ExplainResult};
use super::explainer::Explainer;
use super::record::EvaluationRecord;
use crate::node::{Check, Transformer};

/// Replays check trees and records what happened.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: ExplainConfig,
}

impl Evaluator {
    /// Creates an evaluator with the given configuration
    pub fn new(config: ExplainConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration
    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }

    /// Replays `check` against `value` and records the evaluation.
    ///
    /// # Errors
    ///
    /// Returns `ExplainError::Fault` if a behavior raised. The error carries
    /// the record up to the fault and the original error as its source.
    pub fn explain<T>(&self, check: &Check<T>, value: &T) -> ExplainResult<EvaluationRecord>
    where
        T: ?Sized + Debug,
    {
        let mut cx = Explainer::new(self.config.clone());
        let description = check.to_string();
        let _span = tracing::debug_span!("explain", check = %description).entered();

        let outcome = check.explain_into(value, &mut cx);
        let record = cx.finish(&description);

        match outcome {
            Ok(passed) => {
                tracing::debug!(
                    entries = record.len(),
                    mismatches = record.mismatches().len(),
                    passed,
                    "explanation recorded"
                );
                Ok(record)
            }
            Err(source) => Err(fault(record, source, description)),
        }
    }

    /// Replays `transformer` against `value`, returning its result and the record.
    ///
    /// # Errors
    ///
    /// Returns `ExplainError::Fault` if a segment raised.
    pub fn explain_apply<I, O>(
        &self,
        transformer: &Transformer<I, O>,
        value: &I,
    ) -> ExplainResult<(O, EvaluationRecord)>
    where
        I: ?Sized + Debug,
        O: Debug,
    {
        let mut cx = Explainer::new(self.config.clone());
        let description = transformer.to_string();
        let _span = tracing::debug_span!("explain_apply", transformer = %description).entered();

        let outcome = transformer.explain_into(value, &mut cx);
        let record = cx.finish(&description);

        match outcome {
            Ok(output) => {
                tracing::debug!(entries = record.len(), "explanation recorded");
                Ok((output, record))
            }
            Err(source) => Err(fault(record, source, description)),
        }
    }
}

fn fault(record: EvaluationRecord, source: super::BoxError, root: String) -> ExplainError {
    let node = record
        .fault_origin()
        .map(|e| e.description().to_string())
        .unwrap_or(root);
    ExplainError::Fault {
        node,
        record: Box::new(record),
        source,
    }
}
