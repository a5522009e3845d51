//! Two-column failure reports
//!
//! Rows follow the record depth-first, one row per entry, indented by
//! depth. The left column walks what the check expected; the right column
//! walks what actually happened. Rendering is a pure function of the record
//! and the configuration.

use std::fmt;

use super::config::ReportConfig;
use crate::eval::{EvaluationEntry, EvaluationRecord, Output, Remaining};

const EXPECTED_TITLE: &str = "EXPECTED";
const ACTUAL_TITLE: &str = "ACTUAL";

/// One line of a report, already indented and marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    expected: String,
    actual: String,
    mismatch: bool,
}

impl ReportRow {
    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn actual(&self) -> &str {
        &self.actual
    }

    pub fn is_mismatch(&self) -> bool {
        self.mismatch
    }
}

/// A rendered evaluation record.
///
/// `Display` prints the aligned two-column table; [`Report::expected`] and
/// [`Report::actual`] give each column as its own block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    rows: Vec<ReportRow>,
    outcome: Option<bool>,
    show_header: bool,
    column_gap: usize,
}

impl Report {
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Root outcome of the rendered record, `None` if it faulted
    pub fn outcome(&self) -> Option<bool> {
        self.outcome
    }

    /// The expected column, one line per row
    pub fn expected(&self) -> String {
        self.column(|row| row.expected.as_str())
    }

    /// The actual column, one line per row
    pub fn actual(&self) -> String {
        self.column(|row| row.actual.as_str())
    }

    fn column(&self, cell: impl Fn(&ReportRow) -> &str) -> String {
        self.rows.iter().map(cell).collect::<Vec<_>>().join("\n")
    }

    fn left_width(&self) -> usize {
        let widest = self
            .rows
            .iter()
            .map(|row| row.expected.chars().count())
            .max()
            .unwrap_or(0);
        if self.show_header {
            widest.max(EXPECTED_TITLE.len())
        } else {
            widest
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.left_width();
        let gap = self.column_gap;

        if self.show_header {
            let right = self
                .rows
                .iter()
                .map(|row| row.actual.chars().count())
                .max()
                .unwrap_or(0)
                .max(ACTUAL_TITLE.len());
            writeln!(f, "{:<width$}{:gap$}{}", EXPECTED_TITLE, "", ACTUAL_TITLE)?;
            writeln!(f, "{}", "-".repeat(width + gap + right))?;
        }
        for row in &self.rows {
            writeln!(f, "{:<width$}{:gap$}{}", row.expected, "", row.actual)?;
        }
        Ok(())
    }
}

/// Renders evaluation records into [`Report`]s.
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    config: ReportConfig,
}

impl ReportRenderer {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn render(&self, record: &EvaluationRecord) -> Report {
        let mut rows = Vec::with_capacity(record.len());
        self.walk(record.root(), 0, &mut rows);
        Report {
            rows,
            outcome: record.outcome(),
            show_header: self.config.show_header,
            column_gap: self.config.column_gap,
        }
    }

    fn walk(&self, entry: &EvaluationEntry, depth: usize, rows: &mut Vec<ReportRow>) {
        rows.push(self.row(entry, depth));
        for child in entry.children() {
            if self.config.mismatch_only && !child.contains_mismatch() {
                continue;
            }
            self.walk(child, depth + 1, rows);
        }
        if let Some(remaining) = entry.remaining() {
            rows.push(self.remaining_row(remaining, depth + 1));
        }
    }

    fn row(&self, entry: &EvaluationEntry, depth: usize) -> ReportRow {
        let marker = if entry.is_mismatch() {
            self.config.mismatch_marker.clone()
        } else {
            " ".repeat(self.config.marker_width())
        };
        let indent = self.indent(depth);
        let label = entry.label().map(|l| format!("{} ", l)).unwrap_or_default();
        ReportRow {
            expected: format!("{}{}{}{}", marker, indent, label, expected_text(entry)),
            actual: format!("{}{}{}", indent, label, actual_text(entry)),
            mismatch: entry.is_mismatch(),
        }
    }

    fn remaining_row(&self, remaining: &Remaining, depth: usize) -> ReportRow {
        let marker = " ".repeat(self.config.marker_width());
        let indent = self.indent(depth);
        let values = match remaining {
            Remaining::Elements { values, truncated } => {
                let mut joined = values.join(", ");
                if *truncated {
                    if !joined.is_empty() {
                        joined.push_str(", ");
                    }
                    joined.push_str("...");
                }
                format!("[{}]", joined)
            }
            Remaining::Unavailable => "detail unavailable".to_string(),
        };
        ReportRow {
            expected: format!("{}{}unconsumed", marker, indent),
            actual: format!("{}{}", indent, values),
            mismatch: false,
        }
    }

    fn indent(&self, depth: usize) -> String {
        " ".repeat(depth * self.config.indent_width)
    }
}

fn expected_text(entry: &EvaluationEntry) -> String {
    match (entry.expectation(), entry.expected()) {
        (Some(expectation), Some(false)) => format!("not {}", expectation),
        (Some(expectation), _) => expectation.to_string(),
        (None, Some(expected)) => format!("{} -> {}", entry.description(), expected),
        (None, None) => entry.description().to_string(),
    }
}

fn actual_text(entry: &EvaluationEntry) -> String {
    if let Some(actual) = entry.actual() {
        return actual.to_string();
    }
    let output = match entry.output() {
        Output::Bool(b) => b.to_string(),
        Output::Value(v) => v.clone(),
        Output::Fault(message) => format!("raised {}", message),
        Output::Aborted => "aborted".to_string(),
    };
    format!("{} -> {}", entry.input(), output)
}
