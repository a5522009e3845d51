//! Test-then-explain boundary for validators and assertions
//!
//! Error codes:
//! - CHECK_RAISED (the fast path raised)
//! - CHECK_VIOLATED (the check returned false)
//! - CHECK_EVALUATION_FAULT (the explain path raised; the partial record is rendered)

use std::fmt::Debug;

use thiserror::Error;

use super::renderer::{Report, ReportRenderer};
use crate::eval::{BoxError, Evaluator, ExplainError};
use crate::node::Check;

/// Why [`ensure`] rejected a value
#[derive(Debug, Error)]
pub enum CheckFailure {
    /// The fast path raised; no explanation was attempted.
    #[error("check `{check}` raised: {source}")]
    Raised {
        check: String,
        #[source]
        source: BoxError,
    },

    /// The check evaluated to false. The report is the full explanation.
    #[error("check `{check}` failed\n{report}")]
    Violated { check: String, report: Report },

    /// The fast path returned false but the replay raised.
    ///
    /// The report renders the record up to the faulting node.
    #[error("check `{check}` raised while explaining\n{report}")]
    Explain {
        check: String,
        report: Report,
        #[source]
        source: ExplainError,
    },
}

impl CheckFailure {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CheckFailure::Raised { .. } => "CHECK_RAISED",
            CheckFailure::Violated { .. } => "CHECK_VIOLATED",
            CheckFailure::Explain { source, .. } => source.code(),
        }
    }

    /// Returns the rendered report, unless the fast path raised
    pub fn report(&self) -> Option<&Report> {
        match self {
            CheckFailure::Violated { report, .. } | CheckFailure::Explain { report, .. } => Some(report),
            CheckFailure::Raised { .. } => None,
        }
    }
}

/// Tests `value`, explaining and rendering only if the check fails.
///
/// # Errors
///
/// Returns a [`CheckFailure`] unless the check passes.
pub fn ensure<T>(check: &Check<T>, value: &T) -> Result<(), CheckFailure>
where
    T: ?Sized + Debug,
{
    ensure_with(check, value, &Evaluator::default(), &ReportRenderer::default())
}

/// [`ensure`] with an explicit evaluator and renderer.
///
/// # Errors
///
/// Returns a [`CheckFailure`] unless the check passes.
pub fn ensure_with<T>(
    check: &Check<T>,
    value: &T,
    evaluator: &Evaluator,
    renderer: &ReportRenderer,
) -> Result<(), CheckFailure>
where
    T: ?Sized + Debug,
{
    match check.test(value) {
        Ok(true) => Ok(()),
        Ok(false) => {
            let record = match evaluator.explain(check, value) {
                Ok(record) => record,
                Err(source) => {
                    return Err(CheckFailure::Explain {
                        check: check.to_string(),
                        report: renderer.render(source.record()),
                        source,
                    })
                }
            };
            if record.outcome() != Some(false) {
                tracing::warn!(check = %check, "explain replay disagrees with the fast path");
            }
            Err(CheckFailure::Violated {
                check: check.to_string(),
                report: renderer.render(&record),
            })
        }
        Err(source) => Err(CheckFailure::Raised {
            check: check.to_string(),
            source,
        }),
    }
}
