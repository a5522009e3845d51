//! checktrace - composable checks with faithful failure explanations
//!
//! Checks are built as expression trees of [`Check`] and [`Transformer`]
//! nodes. Calling [`Check::test`] runs the composed behaviors directly.
//! When a check fails, [`Evaluator::explain`] replays the same tree against
//! the same input and records exactly what was evaluated, which the
//! [`report`] module renders as an expected/actual trace.
//!
//! ```
//! use checktrace::prelude::*;
//!
//! let check: Check<str> = not(length().check(less_than(100)));
//! assert!(!check.test("").unwrap());
//!
//! let record = Evaluator::default().explain(&check, "").unwrap();
//! assert_eq!(record.outcome(), Some(false));
//! println!("{}", ReportRenderer::default().render(&record));
//! ```

pub mod eval;
pub mod identity;
pub mod node;
pub mod report;

pub use eval::{BoxError, EvaluationRecord, Evaluator, ExplainConfig, ExplainError};
pub use identity::{Arg, Description, Identity};
pub use node::{Check, ConstructionError, IntoCheck, IntoTransformer, Transformer};
pub use report::{ensure, CheckFailure, Report, ReportConfig, ReportRenderer, ReportRow};

/// Everything needed to build and explain checks.
pub mod prelude {
    pub use crate::eval::{BoxError, EvaluationRecord, Evaluator, ExplainConfig, Output};
    pub use crate::identity::{Arg, Description, Identity};
    pub use crate::node::context::{bind, context, nested, relation, relation2, Bundle, Scope};
    pub use crate::node::logic::{all_of, and, any_of, not, or};
    pub use crate::node::pool::{pooled_check, pooled_count, pooled_transformer};
    pub use crate::node::quantifier::{
        all_match, any_match, none_match, quantify, ElementSource, QuantifierKind, ReplaySource,
    };
    pub use crate::node::transform::transform;
    pub use crate::node::vocabulary::*;
    pub use crate::node::{Check, ConstructionError, IntoCheck, IntoTransformer, LeafCheck, Transformer};
    pub use crate::report::{ensure, CheckFailure, Report, ReportConfig, ReportRenderer, ReportRow};
}
