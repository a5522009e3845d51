//! # Failure Reports
//!
//! Renders an [`crate::EvaluationRecord`] as two aligned columns: what the
//! check expected, and what actually happened. [`ensure`] is the
//! test-then-explain entry point used by validators and assertions.

mod config;
mod renderer;
mod violation;

pub use config::ReportConfig;
pub use renderer::{Report, ReportRenderer, ReportRow};
pub use violation::{ensure, ensure_with, CheckFailure};
